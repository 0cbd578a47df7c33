//! Remembered image sizes
//!
//! Layout needs an aspect ratio for every photo before the image itself has
//! loaded. Sizes seen earlier are kept in a bounded least-recently-used cache
//! that can be persisted through the versioned store.

use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};

use super::masonry::LayoutItem;
use crate::store::{KeyValueStore, StoreError, Versioned};

/// Storage key for persisted dimensions
pub const DIMENSIONS_KEY: &str = "image-dimensions";

/// Schema version for persisted dimensions
pub const DIMENSIONS_VERSION: u32 = 1;

/// Default number of remembered sizes
pub const DEFAULT_CAPACITY: u64 = 1000;

/// Pixel size of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, or `None` for a zero-sized image
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.width > 0 && self.height > 0).then(|| f64::from(self.width) / f64::from(self.height))
    }
}

impl From<Dimensions> for LayoutItem {
    fn from(dimensions: Dimensions) -> Self {
        Self::from_size(dimensions.width, dimensions.height)
    }
}

/// Persisted form of the cache
type Snapshot = Vec<(String, Dimensions)>;

fn snapshot_schema() -> Versioned<Snapshot> {
    Versioned::new(DIMENSIONS_VERSION, Vec::new, |_data, _from| Vec::new())
}

/// Bounded LRU cache of image sizes keyed by object key
#[derive(Clone)]
pub struct DimensionCache {
    cache: Cache<String, Dimensions>,
    capacity: u64,
}

impl DimensionCache {
    /// Create a cache holding at most `capacity` entries
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { cache, capacity }
    }

    /// Maximum number of entries
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Remember the size of `key`
    pub fn insert(&self, key: impl Into<String>, dimensions: Dimensions) {
        self.cache.insert(key.into(), dimensions);
    }

    /// Size of `key`, marking it as recently used
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Dimensions> {
        self.cache.get(key)
    }

    /// Forget `key`
    pub fn remove(&self, key: &str) {
        self.cache.invalidate(key);
    }

    /// Layout item for `key`; unknown sizes give a ratio the layout replaces
    /// with its default
    #[must_use]
    pub fn item_for(&self, key: &str) -> LayoutItem {
        self.get(key)
            .map_or(LayoutItem::new(0.0), LayoutItem::from)
    }

    /// Number of entries after pending evictions are applied
    #[must_use]
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }

    /// Current entries, sorted by key
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Dimensions)> {
        self.cache.run_pending_tasks();
        let mut entries: Snapshot = self
            .cache
            .iter()
            .map(|(key, dimensions): (Arc<String>, Dimensions)| (key.as_ref().clone(), dimensions))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Persist the cache under [`DIMENSIONS_KEY`]
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend write fails.
    pub fn save_to<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), StoreError> {
        snapshot_schema().write_to(store, DIMENSIONS_KEY, &self.entries())
    }

    /// Load a cache persisted by [`DimensionCache::save_to`]
    ///
    /// Corrupt or foreign data yields an empty cache.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub fn restore_from<S: KeyValueStore + ?Sized>(store: &S, capacity: u64) -> Result<Self, StoreError> {
        let cache = Self::new(capacity);
        for (key, dimensions) in snapshot_schema().read_from(store, DIMENSIONS_KEY)? {
            cache.insert(key, dimensions);
        }
        Ok(cache)
    }
}

impl Default for DimensionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for DimensionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimensionCache")
            .field("capacity", &self.capacity)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_insert_and_get() {
        let cache = DimensionCache::new(10);
        cache.insert("a.jpg", Dimensions::new(1920, 1080));
        assert_eq!(cache.get("a.jpg"), Some(Dimensions::new(1920, 1080)));
        assert_eq!(cache.get("b.jpg"), None);
        assert_eq!(cache.len(), 1);

        cache.remove("a.jpg");
        assert_eq!(cache.get("a.jpg"), None);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(Dimensions::new(400, 200).aspect_ratio(), Some(2.0));
        assert_eq!(Dimensions::new(400, 0).aspect_ratio(), None);
    }

    #[test]
    fn test_item_for_unknown_key_uses_default_ratio() {
        let cache = DimensionCache::default();
        cache.insert("wide.jpg", Dimensions::new(300, 100));
        assert!((cache.item_for("wide.jpg").aspect_ratio - 3.0).abs() < 1e-9);
        assert!(cache.item_for("missing.jpg").aspect_ratio.abs() < 1e-9);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = DimensionCache::new(4);
        for i in 0..32 {
            cache.insert(format!("{i}.jpg"), Dimensions::new(i, 1));
        }
        assert!(cache.len() <= 4);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = DimensionCache::new(3);
        for key in ["a.jpg", "b.jpg", "c.jpg"] {
            cache.insert(key, Dimensions::new(1, 1));
        }
        assert_eq!(cache.len(), 3);

        // Touch the oldest entry so "b.jpg" becomes least recently used
        assert!(cache.get("a.jpg").is_some());
        cache.cache.run_pending_tasks();

        cache.insert("d.jpg", Dimensions::new(1, 1));
        assert_eq!(cache.len(), 3);
        assert!(cache.get("a.jpg").is_some());
        assert!(cache.get("b.jpg").is_none());
        assert!(cache.get("d.jpg").is_some());
    }

    #[test]
    fn test_save_and_restore() {
        let store = MemoryStore::new();
        let cache = DimensionCache::new(10);
        cache.insert("b.jpg", Dimensions::new(2, 1));
        cache.insert("a.jpg", Dimensions::new(1, 2));
        cache.save_to(&store).unwrap();

        let restored = DimensionCache::restore_from(&store, 10).unwrap();
        assert_eq!(
            restored.entries(),
            vec![
                ("a.jpg".to_string(), Dimensions::new(1, 2)),
                ("b.jpg".to_string(), Dimensions::new(2, 1)),
            ]
        );
    }

    #[test]
    fn test_restore_from_garbage_is_empty() {
        let store = MemoryStore::new();
        store.set_item(DIMENSIONS_KEY, "{{{").unwrap();
        assert!(DimensionCache::restore_from(&store, 10).unwrap().is_empty());

        store
            .set_item(DIMENSIONS_KEY, r#"{"version":0,"data":[["a",{"width":1,"height":1}]]}"#)
            .unwrap();
        assert!(DimensionCache::restore_from(&store, 10).unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = DimensionCache::new(10);
        cache.insert("a.jpg", Dimensions::new(1, 1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
