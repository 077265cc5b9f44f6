//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when reading broker metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// A passive queue check failed for a reason other than "not found".
    #[error("Probe failed: {0}")]
    Probe(String),
}

impl AdapterError {
    /// Returns true for failures that mean the endpoint could not be reached
    /// at all, as opposed to a reachable endpoint answering badly.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, AdapterError::Connection(_) | AdapterError::Timeout)
    }
}

#[cfg(feature = "rabbitmq")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else if err.is_decode() {
            AdapterError::Parse(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}

#[cfg(feature = "amqp")]
impl From<lapin::Error> for AdapterError {
    fn from(err: lapin::Error) -> Self {
        match err {
            lapin::Error::IOError(e) => AdapterError::Connection(e.to_string()),
            other => AdapterError::Probe(other.to_string()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AdapterError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AdapterError::Timeout
    }
}
