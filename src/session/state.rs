#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Debouncing,
    Describing,
    Synthesizing,
}

impl PipelineStage {
    /// Whether a generation is scheduled or running.
    pub fn is_pending(self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::Describing | Self::Synthesizing)
    }
}

pub fn can_transition(from: PipelineStage, to: PipelineStage) -> bool {
    use PipelineStage::*;
    matches!(
        (from, to),
        (Idle, Debouncing)
            | (Debouncing, Describing)
            | (Describing, Synthesizing)
            | (Describing, Idle)
            | (Synthesizing, Idle)
            // A newer canvas change supersedes whatever is scheduled or running.
            | (Describing, Debouncing)
            | (Synthesizing, Debouncing)
    ) || from == to
}
