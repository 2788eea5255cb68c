//! Analysis pipeline: run state and the orchestrator that drives it

pub mod orchestrator;
pub mod state;

pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome};
pub use state::{PipelineFailure, PipelineState, RunId, StateSnapshot};
