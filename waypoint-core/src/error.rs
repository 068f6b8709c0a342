//! Error types for waypoint-core

use thiserror::Error;

/// Main error type for the waypoint-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider could not be reached or answered with a non-success status
    #[error("provider {provider} unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    /// Provider did not answer within its timeout
    #[error("provider {provider} timed out after {timeout_secs}s")]
    ProviderTimeout { provider: String, timeout_secs: u64 },

    /// Provider answered, but the payload was empty or not the expected shape
    #[error("malformed provider output: {0}")]
    MalformedOutput(String),

    /// Unparseable calendar date in activity history
    #[error("invalid date value: {0:?}")]
    InvalidDate(String),

    /// Snapshot could not be loaded (unknown user, unreadable source)
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl Error {
    /// Whether this error came from the provider being unreachable
    /// rather than from the shape of what it returned.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::ProviderUnavailable { .. } | Error::ProviderTimeout { .. }
        )
    }
}

/// Result type alias for waypoint-core
pub type Result<T> = std::result::Result<T, Error>;
