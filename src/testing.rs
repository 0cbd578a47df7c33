//! Testing utilities for bucketview
//!
//! This module provides helper types and functions for writing tests,
//! including a `TempStore` wrapper for temporary sled stores and photo
//! fixtures.
//!
//! Only available when compiled with `cfg(test)`.

use crate::PhotoRecord;
use crate::store::SledStore;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

/// Wrapper for a temporary sled store that cleans up on drop
///
/// The store lives in its own `tempfile` directory, so parallel tests never
/// share state. The directory is removed when the wrapper goes out of scope.
pub struct TempStore {
    // Field order matters: the store must close before the directory goes.
    store: SledStore,
    _dir: TempDir,
}

impl TempStore {
    /// Create a new empty store in a fresh temporary directory
    ///
    /// # Panics
    /// Panics if the directory or the store cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = SledStore::open(dir.path().join("store")).expect("Failed to open test store");
        Self { store, _dir: dir }
    }

    /// Get a reference to the underlying store
    #[must_use]
    pub const fn store(&self) -> &SledStore {
        &self.store
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an RFC 3339 timestamp
///
/// # Panics
/// Panics if the timestamp is malformed.
#[must_use]
pub fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .expect("Invalid test timestamp")
        .with_timezone(&Utc)
}

/// Build a photo record with a URL derived from its key
#[must_use]
pub fn photo(key: &str, modified: &str) -> PhotoRecord {
    PhotoRecord::new(key, at(modified), format!("https://cdn.example.com/{key}"))
}

/// Keys of a photo list, in order
#[must_use]
pub fn keys(photos: &[PhotoRecord]) -> Vec<&str> {
    photos.iter().map(|p| p.key.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyValueStore;

    #[test]
    fn test_temp_store_is_isolated() {
        let first = TempStore::new();
        let second = TempStore::new();
        first.store().set_item("k", "v").unwrap();
        assert_eq!(second.store().get_item("k").unwrap(), None);
    }

    #[test]
    fn test_photo_fixture() {
        let p = photo("a/1.png", "2024-01-05T10:00:00Z");
        assert_eq!(p.key, "a/1.png");
        assert_eq!(p.url, "https://cdn.example.com/a/1.png");
        assert_eq!(keys(&[p]), vec!["a/1.png"]);
    }
}
