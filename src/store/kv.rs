//! Key-value store backends
//!
//! The persistence layer only needs a browser-local-storage shaped primitive:
//! string keys, string values, whole-value replacement. Two backends are
//! provided: [`MemoryStore`] for tests and embedding, and [`SledStore`] for an
//! on-disk store shared between processes of the same user.

use super::error::StoreError;
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Minimal string key-value storage
///
/// A `set_item` always replaces the whole stored value; there is no partial
/// update. Implementations must make each call atomic on its own.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the value stored under `key` (no-op if absent)
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }
}

/// In-process store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().map_or(0, |items| items.len())
    }

    /// Whether the store holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

/// On-disk store using a sled tree
///
/// All bucketview state lives in a single `local` tree, mirroring the flat
/// namespace of browser local storage.
pub struct SledStore {
    db: Db,
    items: Tree,
}

impl SledStore {
    const TREE: &'static str = "local";

    /// Opens or creates a store at the specified directory
    ///
    /// # Examples
    /// ```no_run
    /// use bucketview::store::{KeyValueStore, SledStore};
    /// let store = SledStore::open("my_store").unwrap();
    /// store.set_item("greeting", "hello").unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database or its tree cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let items = db.open_tree(Self::TREE)?;
        Ok(Self { db, items })
    }

    /// Flush pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the flush fails.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    /// Remove every stored key
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the tree cannot be cleared.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.items.clear()?;
        Ok(())
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for SledStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.items.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| StoreError::InvalidUtf8(key.to_string())),
            None => Ok(None),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key.as_bytes())?;
        Ok(())
    }
}
