//! Error types for the context router

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors surfaced outside the request pipeline.
///
/// The pipeline itself never fails: unknown sessions yield `None`, unknown
/// models fall back to synthesized records and unmatched queries classify as
/// `text`. These variants cover bootstrap and plumbing failures.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for ContextError {
    fn from(err: config::ConfigError) -> Self {
        ContextError::Configuration(err.to_string())
    }
}

impl From<prometheus::Error> for ContextError {
    fn from(err: prometheus::Error) -> Self {
        ContextError::Internal(format!("metrics: {}", err))
    }
}
