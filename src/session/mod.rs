pub mod messages;
pub mod state;
pub mod worker;

use anyhow::{anyhow, Result};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::canvas::{CanvasStateTracker, PixelBuffer};
use crate::options::GenerationParams;
use crate::remote::{Describer, Synthesizer, GENERATION_ERROR_MESSAGE};
use messages::WorkerEvent;
use state::can_transition;
use worker::{spawn_generation, CancelToken, GenerationJob, RepaintHook};

pub use state::PipelineStage;

/// What the output column shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOutput {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The canvas differed from the last snapshot.
    pub dirty: bool,
    /// A generation worker was started on this tick.
    pub started: bool,
}

/// Per-user orchestration state: change detection, debounce and the
/// description + synthesis worker for the latest canvas snapshot.
pub struct GenerationSession {
    tracker: CanvasStateTracker,
    stage: PipelineStage,
    debounce: Duration,
    trigger_at: Option<Instant>,
    token: CancelToken,
    describer: Arc<dyn Describer>,
    synthesizer: Arc<dyn Synthesizer>,
    events_tx: Sender<WorkerEvent>,
    events_rx: Receiver<WorkerEvent>,
    worker: Option<JoinHandle<()>>,
    repaint: Option<RepaintHook>,
    output: SessionOutput,
}

impl GenerationSession {
    pub fn new(
        describer: Arc<dyn Describer>,
        synthesizer: Arc<dyn Synthesizer>,
        debounce: Duration,
    ) -> Self {
        let (events_tx, events_rx) = channel();
        Self {
            tracker: CanvasStateTracker::new(),
            stage: PipelineStage::Idle,
            debounce,
            trigger_at: None,
            token: CancelToken::new(),
            describer,
            synthesizer,
            events_tx,
            events_rx,
            worker: None,
            repaint: None,
            output: SessionOutput::default(),
        }
    }

    /// Called from worker threads whenever they report progress.
    pub fn set_repaint_hook(&mut self, hook: Option<RepaintHook>) {
        self.repaint = hook;
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn is_pending(&self) -> bool {
        self.stage.is_pending()
    }

    pub fn output(&self) -> &SessionOutput {
        &self.output
    }

    pub fn tracker(&self) -> &CanvasStateTracker {
        &self.tracker
    }

    /// Time left before a debounced generation starts.
    pub fn time_until_trigger(&self, now: Instant) -> Option<Duration> {
        self.trigger_at.map(|at| at.saturating_duration_since(now))
    }

    /// One UI refresh cycle.
    pub fn tick(
        &mut self,
        now: Instant,
        current: Option<&PixelBuffer>,
        params: &GenerationParams,
    ) -> Result<TickReport> {
        self.pump();

        let mut report = TickReport::default();
        self.tracker.check_for_change(current);
        if self.tracker.take_dirty() {
            report.dirty = true;
            self.schedule(now)?;
        }

        if self.stage == PipelineStage::Debouncing
            && self.trigger_at.map_or(false, |at| now >= at)
        {
            self.start_generation(*params)?;
            report.started = true;
        }
        Ok(report)
    }

    /// Applies worker events that have arrived since the last call.
    pub fn pump(&mut self) {
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if self.worker.as_ref().map_or(false, JoinHandle::is_finished) {
            if let Some(handle) = self.worker.take() {
                let _ = handle.join();
            }
        }
    }

    /// Blocks until the running generation settles or `timeout` elapses.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.stage.is_running() {
                match self
                    .events_rx
                    .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                {
                    Ok(event) => self.apply_event(event),
                    Err(_) => return false,
                }
            } else {
                self.pump();
                return !self.stage.is_running();
            }
        }
    }

    fn schedule(&mut self, now: Instant) -> Result<()> {
        if self.stage.is_running() {
            // Invalidates the in-flight worker; its late events are ignored.
            let superseded = self.token.current();
            self.token.advance();
            tracing::info!(generation = superseded, "canvas changed, superseding generation");
        }
        self.transition(PipelineStage::Debouncing)?;
        self.trigger_at = Some(now + self.debounce);
        Ok(())
    }

    fn start_generation(&mut self, params: GenerationParams) -> Result<()> {
        let snapshot = self
            .tracker
            .previous()
            .cloned()
            .ok_or_else(|| anyhow!("no canvas snapshot to generate from"))?;
        self.trigger_at = None;
        self.transition(PipelineStage::Describing)?;
        // Output always belongs to the snapshot being generated.
        self.output = SessionOutput::default();

        let generation = self.token.advance();
        tracing::info!(
            generation,
            steps = params.steps(),
            style = params.style.label(),
            "starting generation"
        );
        let job = GenerationJob {
            generation,
            snapshot,
            params,
            describer: Arc::clone(&self.describer),
            synthesizer: Arc::clone(&self.synthesizer),
            token: self.token.clone(),
        };
        match spawn_generation(job, self.events_tx.clone(), self.repaint.clone()) {
            Ok(handle) => {
                // Superseded workers are left to finish on their own.
                self.worker = Some(handle);
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "failed to spawn generation worker");
                self.fail();
                Ok(())
            }
        }
    }

    fn apply_event(&mut self, event: WorkerEvent) {
        if !self.token.is_current(event.generation()) || !self.stage.is_running() {
            tracing::debug!(generation = event.generation(), "dropping stale worker event");
            return;
        }
        match event {
            WorkerEvent::Described { text, .. } => {
                tracing::info!(description = %text, "description received");
                self.output.description = Some(text);
                let _ = self.transition(PipelineStage::Synthesizing);
            }
            WorkerEvent::Synthesized { image_url, .. } => {
                tracing::info!(%image_url, "image generated");
                self.output.image_url = Some(image_url);
                let _ = self.transition(PipelineStage::Idle);
            }
            WorkerEvent::Failed { error, .. } => {
                tracing::warn!(%error, "generation failed");
                self.fail();
            }
        }
    }

    fn fail(&mut self) {
        self.output.error = Some(GENERATION_ERROR_MESSAGE.to_string());
        self.stage = PipelineStage::Idle;
        self.trigger_at = None;
    }

    fn transition(&mut self, to: PipelineStage) -> Result<()> {
        if !can_transition(self.stage, to) {
            return Err(anyhow!(
                "invalid pipeline transition from {:?} to {:?}",
                self.stage,
                to
            ));
        }
        if self.stage != to {
            tracing::debug!(from = ?self.stage, ?to, "pipeline transition");
        }
        self.stage = to;
        Ok(())
    }
}
