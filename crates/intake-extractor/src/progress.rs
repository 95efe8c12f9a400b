//! Progress reporting for pipeline runs

use intake_domain::{PipelineRun, Stage, StageStatus, TransitionError};
use std::sync::Mutex;
use tracing::debug;

/// Receives every stage transition of a run, on the calling thread
pub trait ProgressSink: Send + Sync {
    /// Called after `stage` (at `index`) moved to `status`
    fn on_transition(&self, index: usize, stage: Stage, status: StageStatus);
}

/// Sink that ignores all transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_transition(&self, _index: usize, _stage: Stage, _status: StageStatus) {}
}

/// Sink that forwards transitions to a closure
pub struct FnSink<F>(pub F);

impl<F> ProgressSink for FnSink<F>
where
    F: Fn(usize, Stage, StageStatus) + Send + Sync,
{
    fn on_transition(&self, index: usize, stage: Stage, status: StageStatus) {
        (self.0)(index, stage, status)
    }
}

/// Sink that records transitions for later inspection
#[derive(Debug, Default)]
pub struct RecordingSink {
    transitions: Mutex<Vec<(usize, Stage, StageStatus)>>,
}

impl RecordingSink {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All transitions seen so far, in order
    pub fn transitions(&self) -> Vec<(usize, Stage, StageStatus)> {
        self.transitions
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    /// Replay the transitions, returning the statuses after each one
    pub fn history(&self) -> Vec<[StageStatus; 3]> {
        let mut current = [StageStatus::Pending; 3];
        self.transitions()
            .into_iter()
            .map(|(index, _, status)| {
                current[index] = status;
                current
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn on_transition(&self, index: usize, stage: Stage, status: StageStatus) {
        if let Ok(mut transitions) = self.transitions.lock() {
            transitions.push((index, stage, status));
        }
    }
}

/// A [`PipelineRun`] that reports each accepted transition to a sink
pub(crate) struct StepTracker<'a> {
    run: PipelineRun,
    sink: &'a dyn ProgressSink,
}

impl<'a> StepTracker<'a> {
    /// Start tracking a fresh run; every stage is reported as pending
    pub(crate) fn new(sink: &'a dyn ProgressSink) -> Self {
        let tracker = Self {
            run: PipelineRun::new(),
            sink,
        };
        for stage in Stage::ALL {
            tracker.emit(stage);
        }
        tracker
    }

    pub(crate) fn begin(&mut self, stage: Stage) -> Result<(), TransitionError> {
        self.run.start(stage)?;
        self.emit(stage);
        Ok(())
    }

    pub(crate) fn complete(&mut self, stage: Stage) -> Result<(), TransitionError> {
        self.run.complete(stage)?;
        self.emit(stage);
        Ok(())
    }

    /// Fail whichever stage is processing; returns it
    pub(crate) fn fail_current(&mut self) -> Option<Stage> {
        let stage = self.run.current()?;
        self.run.fail(stage).ok()?;
        self.emit(stage);
        Some(stage)
    }

    pub(crate) fn run(&self) -> PipelineRun {
        self.run
    }

    fn emit(&self, stage: Stage) {
        let status = self.run.status(stage);
        debug!("Stage {} -> {}", stage, status);
        self.sink.on_transition(stage.index(), stage, status);
    }
}
