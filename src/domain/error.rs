// Error types shared by the modeling layer and the solve pipeline

use super::engine::EngineError;

/// Error types for building, solving and reading optimization programs
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Illegal state: {message}")]
    IllegalState {
        message: String,
        #[source]
        source: Option<EngineError>,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Solver execution failed: {message}")]
    SolveFailed {
        message: String,
        #[source]
        source: Option<EngineError>,
    },

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),
}

impl ModelError {
    pub(crate) fn state(message: impl Into<String>) -> Self {
        ModelError::IllegalState {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn engine_state(message: impl Into<String>, source: EngineError) -> Self {
        ModelError::IllegalState {
            message: format!("{}: {}", message.into(), source),
            source: Some(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
