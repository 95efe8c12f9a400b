//! Stage module - the three-step state machine of a pipeline run

use std::fmt;
use thiserror::Error;

/// One of the ordered steps of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Read the raw document into plain text
    Ingest,

    /// Send the prompt to the generation service
    Analyze,

    /// Parse the reply, normalize the record and persist it
    Finalize,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 3] = [Stage::Ingest, Stage::Analyze, Stage::Finalize];

    /// Zero-based position of the stage
    pub fn index(&self) -> usize {
        match self {
            Stage::Ingest => 0,
            Stage::Analyze => 1,
            Stage::Finalize => 2,
        }
    }

    /// Stage at a position, if any
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The stage that must complete before this one may start
    pub fn previous(&self) -> Option<Self> {
        match self {
            Stage::Ingest => None,
            Stage::Analyze => Some(Stage::Ingest),
            Stage::Finalize => Some(Stage::Analyze),
        }
    }

    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Analyze => "analyze",
            Stage::Finalize => "finalize",
        }
    }

    /// Short label shown by progress displays
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Ingest => "Upload file",
            Stage::Analyze => "AI analysis",
            Stage::Finalize => "Processing and saving",
        }
    }

    /// One-line description shown under the label
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Ingest => "Preparing document for analysis",
            Stage::Analyze => "Analyzing the document with the model",
            Stage::Finalize => "Creating the feature request",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StageStatus {
    /// Not started
    #[default]
    Pending,
    /// Running
    Processing,
    /// Finished successfully
    Completed,
    /// Failed; the run is terminal
    Error,
}

impl StageStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Processing => "processing",
            StageStatus::Completed => "completed",
            StageStatus::Error => "error",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition the state machine refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The run already has a failed stage
    #[error("run is terminal: stage '{0}' failed")]
    Terminal(Stage),

    /// Another stage is still processing
    #[error("stage '{0}' is still processing")]
    Busy(Stage),

    /// The previous stage has not completed
    #[error("stage '{stage}' cannot start before '{requires}' completes")]
    OutOfOrder {
        /// Stage that was asked to start
        stage: Stage,
        /// Stage that must complete first
        requires: Stage,
    },

    /// The stage is not in the status the transition expects
    #[error("stage '{stage}' is {actual}, expected {expected}")]
    WrongStatus {
        /// Stage being transitioned
        stage: Stage,
        /// Status required for the transition
        expected: StageStatus,
        /// Status actually held
        actual: StageStatus,
    },
}

/// Status of the three stages of one ingestion attempt
///
/// Enforced invariants:
/// - a stage leaves `Pending` only after the previous stage is `Completed`
/// - at most one stage is `Processing`
/// - once a stage is `Error` no further stage may start
///
/// Together these keep the completed stages a prefix of [`Stage::ALL`].
///
/// # Examples
///
/// ```
/// use intake_domain::{PipelineRun, Stage, StageStatus};
///
/// let mut run = PipelineRun::new();
/// run.start(Stage::Ingest).unwrap();
/// run.complete(Stage::Ingest).unwrap();
/// assert!(run.start(Stage::Finalize).is_err());
/// run.start(Stage::Analyze).unwrap();
/// run.fail(Stage::Analyze).unwrap();
/// assert!(run.is_terminal());
/// assert_eq!(run.status(Stage::Finalize), StageStatus::Pending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineRun {
    statuses: [StageStatus; 3],
}

impl PipelineRun {
    /// Create a run with every stage pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Put every stage back to pending
    pub fn reset(&mut self) {
        self.statuses = [StageStatus::Pending; 3];
    }

    /// Status of one stage
    pub fn status(&self, stage: Stage) -> StageStatus {
        self.statuses[stage.index()]
    }

    /// All statuses in stage order
    pub fn statuses(&self) -> [StageStatus; 3] {
        self.statuses
    }

    /// The stage currently processing, if any
    pub fn current(&self) -> Option<Stage> {
        self.find(StageStatus::Processing)
    }

    /// The stage that failed, if any
    pub fn failed_stage(&self) -> Option<Stage> {
        self.find(StageStatus::Error)
    }

    /// True once a stage failed or every stage completed
    pub fn is_terminal(&self) -> bool {
        self.failed_stage().is_some() || self.is_completed()
    }

    /// True when all three stages completed
    pub fn is_completed(&self) -> bool {
        self.statuses.iter().all(|s| *s == StageStatus::Completed)
    }

    /// Move a pending stage to processing
    pub fn start(&mut self, stage: Stage) -> Result<(), TransitionError> {
        if let Some(failed) = self.failed_stage() {
            return Err(TransitionError::Terminal(failed));
        }
        if let Some(busy) = self.current() {
            return Err(TransitionError::Busy(busy));
        }
        if let Some(previous) = stage.previous() {
            if self.status(previous) != StageStatus::Completed {
                return Err(TransitionError::OutOfOrder {
                    stage,
                    requires: previous,
                });
            }
        }
        self.transition(stage, StageStatus::Pending, StageStatus::Processing)
    }

    /// Move a processing stage to completed
    pub fn complete(&mut self, stage: Stage) -> Result<(), TransitionError> {
        self.transition(stage, StageStatus::Processing, StageStatus::Completed)
    }

    /// Move a processing stage to error, making the run terminal
    pub fn fail(&mut self, stage: Stage) -> Result<(), TransitionError> {
        self.transition(stage, StageStatus::Processing, StageStatus::Error)
    }

    fn find(&self, status: StageStatus) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| self.status(*s) == status)
    }

    fn transition(
        &mut self,
        stage: Stage,
        expected: StageStatus,
        next: StageStatus,
    ) -> Result<(), TransitionError> {
        let actual = self.status(stage);
        if actual != expected {
            return Err(TransitionError::WrongStatus {
                stage,
                expected,
                actual,
            });
        }
        self.statuses[stage.index()] = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_through(stage: Stage) -> PipelineRun {
        let mut run = PipelineRun::new();
        for s in Stage::ALL {
            run.start(s).unwrap();
            run.complete(s).unwrap();
            if s == stage {
                break;
            }
        }
        run
    }

    #[test]
    fn test_new_run_is_all_pending() {
        let run = PipelineRun::new();
        assert_eq!(run.statuses(), [StageStatus::Pending; 3]);
        assert!(run.current().is_none());
        assert!(!run.is_terminal());
    }

    #[test]
    fn test_happy_path() {
        let run = completed_through(Stage::Finalize);
        assert!(run.is_completed());
        assert!(run.is_terminal());
        assert!(run.failed_stage().is_none());
    }

    #[test]
    fn test_cannot_skip_stage() {
        let mut run = PipelineRun::new();
        let err = run.start(Stage::Analyze).unwrap_err();
        assert_eq!(
            err,
            TransitionError::OutOfOrder {
                stage: Stage::Analyze,
                requires: Stage::Ingest
            }
        );
    }

    #[test]
    fn test_only_one_processing() {
        let mut run = PipelineRun::new();
        run.start(Stage::Ingest).unwrap();
        assert_eq!(
            run.start(Stage::Analyze).unwrap_err(),
            TransitionError::Busy(Stage::Ingest)
        );
    }

    #[test]
    fn test_error_is_terminal() {
        let mut run = completed_through(Stage::Ingest);
        run.start(Stage::Analyze).unwrap();
        run.fail(Stage::Analyze).unwrap();

        assert_eq!(run.failed_stage(), Some(Stage::Analyze));
        assert_eq!(
            run.start(Stage::Finalize).unwrap_err(),
            TransitionError::Terminal(Stage::Analyze)
        );
        assert_eq!(run.status(Stage::Ingest), StageStatus::Completed);
        assert_eq!(run.status(Stage::Finalize), StageStatus::Pending);
    }

    #[test]
    fn test_complete_requires_processing() {
        let mut run = PipelineRun::new();
        assert!(matches!(
            run.complete(Stage::Ingest),
            Err(TransitionError::WrongStatus { .. })
        ));
        assert!(run.fail(Stage::Ingest).is_err());
    }

    #[test]
    fn test_restart_completed_stage_rejected() {
        let mut run = completed_through(Stage::Ingest);
        assert!(run.start(Stage::Ingest).is_err());
    }

    #[test]
    fn test_reset() {
        let mut run = completed_through(Stage::Analyze);
        run.reset();
        assert_eq!(run, PipelineRun::new());
    }

    #[test]
    fn test_stage_index_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_index(stage.index()), Some(stage));
        }
        assert_eq!(Stage::from_index(3), None);
    }
}
