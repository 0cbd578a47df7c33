//! In-process object store

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use super::client::{ObjectInfo, ObjectStore};
use super::error::GalleryError;

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    last_modified: DateTime<Utc>,
}

/// Object store kept in memory, for tests and offline use
///
/// Can be switched offline to make every request fail.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    offline: AtomicBool,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object with an explicit modification time
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Poisoned` if the lock is poisoned.
    pub fn insert(
        &self,
        key: impl Into<String>,
        body: impl Into<Vec<u8>>,
        last_modified: DateTime<Utc>,
    ) -> Result<(), GalleryError> {
        let object = StoredObject {
            body: body.into(),
            last_modified,
        };
        self.objects
            .write()
            .map_err(|_| GalleryError::Poisoned)?
            .insert(key.into(), object);
        Ok(())
    }

    /// Make every following request fail (or succeed again)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored objects
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().map_or(0, |objects| objects.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn online(&self) -> Result<(), GalleryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(GalleryError::Backend("store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn info(key: &str, object: &StoredObject) -> ObjectInfo {
        ObjectInfo {
            key: key.to_string(),
            last_modified: object.last_modified,
            size: object.body.len() as u64,
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    fn list(&self) -> Result<Vec<ObjectInfo>, GalleryError> {
        self.online()?;
        let objects = self.objects.read().map_err(|_| GalleryError::Poisoned)?;
        Ok(objects.iter().map(|(key, object)| Self::info(key, object)).collect())
    }

    fn head(&self, key: &str) -> Result<Option<ObjectInfo>, GalleryError> {
        self.online()?;
        let objects = self.objects.read().map_err(|_| GalleryError::Poisoned)?;
        Ok(objects.get(key).map(|object| Self::info(key, object)))
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, GalleryError> {
        self.online()?;
        let objects = self.objects.read().map_err(|_| GalleryError::Poisoned)?;
        objects
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| GalleryError::NotFound(key.to_string()))
    }

    fn put(&self, key: &str, body: &[u8]) -> Result<(), GalleryError> {
        self.online()?;
        self.insert(key, body, Utc::now())
    }

    fn delete(&self, key: &str) -> Result<(), GalleryError> {
        self.online()?;
        self.objects
            .write()
            .map_err(|_| GalleryError::Poisoned)?
            .remove(key);
        Ok(())
    }
}
