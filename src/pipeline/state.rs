//! Pipeline run state

use crate::error::ErrorKind;
use crate::llm::validator::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one submission on one orchestrator. Strictly increasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFailure {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Extracting,
    AwaitingInference,
    Validating,
    Succeeded(AnalysisResult),
    Failed(PipelineFailure),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded(_) | PipelineState::Failed(_))
    }

    /// A run is in flight and new submissions must be refused.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Extracting | PipelineState::AwaitingInference | PipelineState::Validating
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Extracting => "extracting resume text",
            PipelineState::AwaitingInference => "waiting for the model",
            PipelineState::Validating => "validating response",
            PipelineState::Succeeded(_) => "succeeded",
            PipelineState::Failed(_) => "failed",
        }
    }
}

/// Current state plus the run it belongs to (`None` while idle).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateSnapshot {
    pub run_id: Option<RunId>,
    pub state: PipelineState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_classification() {
        let failed = PipelineState::Failed(PipelineFailure {
            kind: ErrorKind::Inference,
            message: "boom".to_string(),
        });

        assert!(!PipelineState::Idle.is_busy());
        assert!(!PipelineState::Idle.is_terminal());
        assert!(PipelineState::AwaitingInference.is_busy());
        assert!(failed.is_terminal());
        assert!(!failed.is_busy());
    }

    #[test]
    fn test_run_ids_order() {
        assert!(RunId(2) > RunId(1));
        assert_eq!(RunId(5).to_string(), "#5");
    }
}
