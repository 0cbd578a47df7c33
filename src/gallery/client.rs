//! Object store seam
//!
//! The gallery only needs listing, metadata, upload and delete. Real S3
//! clients live outside this crate and implement [`ObjectStore`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::GalleryError;

/// Listing entry for one stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub size: u64,
}

/// Minimal blocking object store interface
pub trait ObjectStore {
    /// Every object in the bucket
    ///
    /// # Errors
    ///
    /// Returns `GalleryError` if the listing cannot be retrieved.
    fn list(&self) -> Result<Vec<ObjectInfo>, GalleryError>;

    /// Metadata of `key`, or `None` if absent
    ///
    /// # Errors
    ///
    /// Returns `GalleryError` if the request fails.
    fn head(&self, key: &str) -> Result<Option<ObjectInfo>, GalleryError>;

    /// Content of `key`
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::NotFound` for a missing key, or another
    /// `GalleryError` if the request fails.
    fn get(&self, key: &str) -> Result<Vec<u8>, GalleryError>;

    /// Store `body` under `key`, replacing any existing object
    ///
    /// # Errors
    ///
    /// Returns `GalleryError` if the upload fails.
    fn put(&self, key: &str, body: &[u8]) -> Result<(), GalleryError>;

    /// Remove `key`
    ///
    /// # Errors
    ///
    /// Returns `GalleryError` if the request fails.
    fn delete(&self, key: &str) -> Result<(), GalleryError>;
}

impl<C: ObjectStore + ?Sized> ObjectStore for &C {
    fn list(&self) -> Result<Vec<ObjectInfo>, GalleryError> {
        (**self).list()
    }

    fn head(&self, key: &str) -> Result<Option<ObjectInfo>, GalleryError> {
        (**self).head(key)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, GalleryError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, body: &[u8]) -> Result<(), GalleryError> {
        (**self).put(key, body)
    }

    fn delete(&self, key: &str) -> Result<(), GalleryError> {
        (**self).delete(key)
    }
}
