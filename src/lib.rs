//! Resume compatibility analysis library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod pipeline;

pub use config::{Config, Credentials};
pub use error::{ErrorKind, Result, ResumeLensError};
pub use pipeline::{AnalysisOrchestrator, AnalysisOutcome, PipelineState};
