//! Error types for changelog-pr.

use thiserror::Error;

/// Main error type for changelog-pr operations.
#[derive(Error, Debug)]
pub enum ChangelogPrError {
    // Input errors: always raised before the first API call
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Branch not found: {}", .0.join(", "))]
    BranchNotFound(Vec<String>),

    // Forge errors are surfaced verbatim
    #[error("{0}")]
    UpstreamApi(String),

    #[error("Git command failed: {0}")]
    Git(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),
}

/// Result type alias using ChangelogPrError
pub type Result<T> = std::result::Result<T, ChangelogPrError>;

impl ChangelogPrError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an upstream API error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamApi(msg.into())
    }
}

impl From<octocrab::Error> for ChangelogPrError {
    fn from(err: octocrab::Error) -> Self {
        Self::UpstreamApi(err.to_string())
    }
}
