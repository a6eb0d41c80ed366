//! Error types for the ipup cycle
//!
//! Every failure a cycle can hit maps onto one of these variants, and every
//! variant maps onto a distinct process exit code so operators can tell the
//! failure classes apart from the scheduler's logs alone.

use thiserror::Error;

/// Result type alias for ipup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the ipup cycle
#[derive(Error, Debug)]
pub enum Error {
    /// No detection endpoint returned a well-formed address
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Persisted state unreadable or unwritable for reasons other than absence
    #[error("state store error: {0}")]
    StateStore(String),

    /// Publish failed transiently (timeout, 5xx, rate limiting); worth
    /// retrying within the same cycle
    #[error("publish error (retryable): {0}")]
    PublishRetryable(String),

    /// Publish rejected by the destination (auth, 4xx, bad destination
    /// config); no further attempts this cycle
    #[error("publish error (fatal): {0}")]
    PublishFatal(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Another invocation holds the cycle lock
    #[error("lock error: {0}")]
    Lock(String),

    /// I/O errors not attributable to a more specific class
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a retryable publish error
    pub fn publish_retryable(msg: impl Into<String>) -> Self {
        Self::PublishRetryable(msg.into())
    }

    /// Create a fatal publish error
    pub fn publish_fatal(msg: impl Into<String>) -> Self {
        Self::PublishFatal(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a lock error
    pub fn lock(msg: impl Into<String>) -> Self {
        Self::Lock(msg.into())
    }

    /// Whether another publish attempt within the same cycle may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PublishRetryable(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(Error::publish_retryable("timeout").is_retryable());
        assert!(!Error::publish_fatal("401").is_retryable());
        assert!(!Error::resolution("no endpoints").is_retryable());
        assert!(!Error::state_store("permission denied").is_retryable());
    }
}
