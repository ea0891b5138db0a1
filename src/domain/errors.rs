//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Empty or duplicate label set, or a zero-sized pipeline.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Predict was called before any training session was started.
    #[error("Model not ready: no training session has been started")]
    ModelNotReady,

    #[error("History source error: {0}")]
    History(String),

    #[error("Input error: {0}")]
    Input(String),
}
