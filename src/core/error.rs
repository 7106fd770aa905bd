//! Error types for slamon.

use thiserror::Error;

/// Result type alias for slamon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in slamon operations.
#[derive(Error, Debug)]
pub enum Error {
    // Telemetry repository errors
    #[error("telemetry repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("unexpected telemetry repository response: {0}")]
    RepositoryData(String),

    // Serialization errors
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// True for transport-level failures that the outer assessment loop
    /// may see resolved on its next schedule.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::RepositoryUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
