/// Progress reported by a generation worker, tagged with its generation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Described { generation: u64, text: String },
    Synthesized { generation: u64, image_url: String },
    Failed { generation: u64, error: String },
}

impl WorkerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            WorkerEvent::Described { generation, .. }
            | WorkerEvent::Synthesized { generation, .. }
            | WorkerEvent::Failed { generation, .. } => *generation,
        }
    }
}
