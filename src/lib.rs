//! Bucketview - gallery core for images kept in S3-compatible storage
//!
//! This library provides the pieces of a photo gallery that do not depend on
//! any particular UI: filtering and searching the photo list, packing it into
//! justified rows, deriving object keys for uploads, and persisting client
//! state through versioned, migratable envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod config;
pub mod filters;
pub mod gallery;
pub mod keys;
pub mod layout;
pub mod output;
pub mod settings;
pub mod store;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum BucketviewError {
    /// Key-value store error
    #[error("Store error: {0}")]
    StoreError(#[from] store::StoreError),
    /// Object store or gallery error
    #[error("Gallery error: {0}")]
    GalleryError(#[from] gallery::GalleryError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Malformed JSON input
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// One object in the bucket, as shown in the gallery
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    /// Full object key, e.g. `i/2024/05/01/abc-def.jpg`
    pub key: String,
    pub last_modified: DateTime<Utc>,
    /// Public URL the image is served from
    pub url: String,
}

impl PhotoRecord {
    /// Create a new `PhotoRecord`
    #[must_use]
    pub fn new(key: impl Into<String>, last_modified: DateTime<Utc>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            last_modified,
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, photo};

    #[test]
    fn test_photo_record_json_shape() {
        let record = photo("a/b.jpg", "2024-01-02T03:04:05Z");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["key"], "a/b.jpg");
        assert_eq!(json["lastModified"], "2024-01-02T03:04:05Z");
        assert_eq!(json["url"], "https://cdn.example.com/a/b.jpg");

        let back: PhotoRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.last_modified, at("2024-01-02T03:04:05Z"));
    }

    #[test]
    fn test_error_conversion() {
        let err: BucketviewError = gallery::GalleryError::NotFound("x".into()).into();
        assert_eq!(err.to_string(), "Gallery error: Object not found: x");
        let err = BucketviewError::InvalidInput("bad width".into());
        assert_eq!(err.to_string(), "Invalid input: bad width");
    }
}
