//! Error handling for the resume analysis pipeline

use crate::pipeline::state::RunId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeLensError {
    #[error("Precondition failed: {0}")]
    Precondition(PreconditionViolation),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Validation error in '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Run {0} was superseded before it finished")]
    Superseded(RunId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeLensError>;

/// Why a submission was refused before any pipeline stage ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionViolation {
    MissingDocument,
    EmptyRoleContext,
    RunInFlight(RunId),
}

impl fmt::Display for PreconditionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreconditionViolation::MissingDocument => write!(f, "no resume document was provided"),
            PreconditionViolation::EmptyRoleContext => {
                write!(f, "a role title or role description is required")
            }
            PreconditionViolation::RunInFlight(run_id) => {
                write!(f, "analysis {} is still in progress", run_id)
            }
        }
    }
}

/// Coarse error classification surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Precondition,
    Extraction,
    Configuration,
    Inference,
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Precondition => "PreconditionError",
            ErrorKind::Extraction => "ExtractionError",
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Inference => "InferenceError",
            ErrorKind::Validation => "ValidationError",
        };
        f.write_str(name)
    }
}

impl ResumeLensError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ResumeLensError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Pipeline classification, `None` for errors raised outside the pipeline.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ResumeLensError::Precondition(_) => Some(ErrorKind::Precondition),
            ResumeLensError::Extraction(_) => Some(ErrorKind::Extraction),
            ResumeLensError::Configuration(_) => Some(ErrorKind::Configuration),
            ResumeLensError::Inference(_) => Some(ErrorKind::Inference),
            ResumeLensError::Validation { .. } => Some(ErrorKind::Validation),
            ResumeLensError::Superseded(_)
            | ResumeLensError::Io(_)
            | ResumeLensError::InvalidInput(_)
            | ResumeLensError::OutputFormatting(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_field() {
        let err = ResumeLensError::validation("score", "must be an integer");
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        assert!(err.to_string().contains("'score'"));
    }

    #[test]
    fn test_non_pipeline_errors_have_no_kind() {
        let err = ResumeLensError::InvalidInput("bad flag".to_string());
        assert_eq!(err.kind(), None);
        assert_eq!(ResumeLensError::Superseded(RunId(3)).kind(), None);
    }

    #[test]
    fn test_precondition_message() {
        let err = ResumeLensError::Precondition(PreconditionViolation::RunInFlight(RunId(7)));
        assert_eq!(err.kind(), Some(ErrorKind::Precondition));
        assert!(err.to_string().contains("#7"));
    }
}
