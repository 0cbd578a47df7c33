//! Error types for the persistence layer
//!
//! Corrupt or outdated data is never reported through these errors: the
//! versioned envelope recovers from it locally. What remains are failures of
//! the backing key-value store itself.

use thiserror::Error;

/// Errors raised by key-value store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents a sled database error
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),

    /// A stored value is not valid UTF-8
    #[error("Stored value for '{0}' is not valid UTF-8")]
    InvalidUtf8(String),

    /// A value could not be serialized into an envelope
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The in-memory store lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Reason a stored value was rejected by a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    /// Create a validation error from any message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}
