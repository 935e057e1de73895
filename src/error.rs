use std::io;
use std::result::Result as StdResult;
use thiserror::Error;

use crate::models::Category;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to fetch token data for category '{0}'")]
    FetchFailed(Category),
    #[error("{source} (gave up after {attempts} attempts)")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// Only transient fetch failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::FetchFailed(_))
    }

    /// Message shown to store consumers. Exhausted retries report the last
    /// underlying failure rather than the wrapper.
    pub fn user_message(&self) -> String {
        match self {
            Error::RetriesExhausted { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::InternalError(err.to_string())
    }
}

pub type Result<T> = StdResult<T, Error>;
