use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::canvas::PixelBuffer;
use crate::options::GenerationParams;
use crate::remote::{Describer, Synthesizer};
use crate::session::messages::WorkerEvent;

pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

/// Shared generation counter. Advancing it supersedes every older worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    current: Arc<AtomicU64>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation and returns its id.
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

pub struct GenerationJob {
    pub generation: u64,
    pub snapshot: PixelBuffer,
    pub params: GenerationParams,
    pub describer: Arc<dyn Describer>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub token: CancelToken,
}

/// Runs the description then synthesis calls for one canvas snapshot.
///
/// Stops quietly before the next remote call once the job is superseded.
pub fn run_generation(job: &GenerationJob, mut emit: impl FnMut(WorkerEvent)) {
    let generation = job.generation;
    let fail = |error: String| WorkerEvent::Failed { generation, error };

    let jpeg = match job.snapshot.encode_jpeg() {
        Ok(bytes) => bytes,
        Err(err) => return emit(fail(format!("{err:#}"))),
    };
    if !job.token.is_current(generation) {
        tracing::debug!(generation, "superseded before description");
        return;
    }

    let description = match job.describer.describe(&jpeg) {
        Ok(text) => text,
        Err(err) => return emit(fail(err.to_string())),
    };
    emit(WorkerEvent::Described {
        generation,
        text: description.clone(),
    });
    if !job.token.is_current(generation) {
        tracing::debug!(generation, "superseded before synthesis");
        return;
    }

    let png = match job.snapshot.encode_png() {
        Ok(bytes) => bytes,
        Err(err) => return emit(fail(format!("{err:#}"))),
    };
    match job.synthesizer.synthesize(&png, &description, &job.params) {
        Ok(image_url) => emit(WorkerEvent::Synthesized {
            generation,
            image_url,
        }),
        Err(err) => emit(fail(err.to_string())),
    }
}

pub fn spawn_generation(
    job: GenerationJob,
    events: Sender<WorkerEvent>,
    repaint: Option<RepaintHook>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("generation-{}", job.generation))
        .spawn(move || {
            let notify = |event: WorkerEvent| {
                let _ = events.send(event);
                if let Some(hook) = &repaint {
                    hook();
                }
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| run_generation(&job, notify)));
            if outcome.is_err() {
                tracing::error!(generation = job.generation, "generation worker panicked");
                notify(WorkerEvent::Failed {
                    generation: job.generation,
                    error: "generation worker panicked".into(),
                });
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteApiError;

    struct FixedDescriber(&'static str);

    impl Describer for FixedDescriber {
        fn describe(&self, _image: &[u8]) -> Result<String, RemoteApiError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingDescriber;

    impl Describer for FailingDescriber {
        fn describe(&self, _image: &[u8]) -> Result<String, RemoteApiError> {
            Err(RemoteApiError::MissingCredential { service: "openai" })
        }
    }

    struct EchoSynthesizer;

    impl Synthesizer for EchoSynthesizer {
        fn synthesize(
            &self,
            image_png: &[u8],
            description: &str,
            params: &GenerationParams,
        ) -> Result<String, RemoteApiError> {
            assert_eq!(&image_png[1..4], b"PNG");
            Ok(format!("https://out/{}/{}", params.steps(), description.len()))
        }
    }

    fn job(describer: Arc<dyn Describer>, token: &CancelToken) -> GenerationJob {
        GenerationJob {
            generation: token.advance(),
            snapshot: PixelBuffer::blank(8, 8),
            params: GenerationParams::default(),
            describer,
            synthesizer: Arc::new(EchoSynthesizer),
            token: token.clone(),
        }
    }

    #[test]
    fn successful_run_emits_description_then_image() {
        let token = CancelToken::new();
        let job = job(Arc::new(FixedDescriber("a cat")), &token);
        let mut events = Vec::new();
        run_generation(&job, |e| events.push(e));
        assert_eq!(
            events,
            vec![
                WorkerEvent::Described {
                    generation: 1,
                    text: "a cat".into()
                },
                WorkerEvent::Synthesized {
                    generation: 1,
                    image_url: "https://out/7/5".into()
                },
            ]
        );
    }

    #[test]
    fn description_failure_skips_synthesis() {
        let token = CancelToken::new();
        let job = job(Arc::new(FailingDescriber), &token);
        let mut events = Vec::new();
        run_generation(&job, |e| events.push(e));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], WorkerEvent::Failed { generation: 1, .. }));
    }

    #[test]
    fn superseded_job_makes_no_calls() {
        let token = CancelToken::new();
        let job = job(Arc::new(FixedDescriber("a cat")), &token);
        token.advance();
        let mut events = Vec::new();
        run_generation(&job, |e| events.push(e));
        assert!(events.is_empty());
    }
}
