//! Read/write cell over a stored value

use super::envelope::Versioned;
use super::error::StoreError;
use super::kv::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value loaded from a key-value store and written back on every change
///
/// The cell keeps the last read or written value in memory. Writes always
/// replace the stored envelope as a whole, so two cells racing on the same key
/// never leave a half-merged document behind.
///
/// # Examples
///
/// ```
/// use bucketview::store::{MemoryStore, StoredCell, Versioned};
///
/// let store = MemoryStore::new();
/// let schema = Versioned::new(1, || 0_u32, |_, _| 0);
/// let mut counter = StoredCell::load(&store, "counter", schema).unwrap();
/// counter.set(5).unwrap();
/// assert_eq!(*counter.get(), 5);
/// ```
#[derive(Debug)]
pub struct StoredCell<T, S> {
    store: S,
    key: String,
    schema: Versioned<T>,
    value: T,
}

impl<T, S> StoredCell<T, S>
where
    T: Serialize + DeserializeOwned + 'static,
    S: KeyValueStore,
{
    /// Load the value stored under `key`, recovering from corrupt data
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub fn load(store: S, key: impl Into<String>, schema: Versioned<T>) -> Result<Self, StoreError> {
        let key = key.into();
        let value = schema.read_from(&store, &key)?;
        Ok(Self {
            store,
            key,
            schema,
            value,
        })
    }

    /// Current value
    #[must_use]
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// Storage key of this cell
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Persist a new value, then make it current
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails; the cached value is unchanged.
    pub fn set(&mut self, value: T) -> Result<(), StoreError> {
        self.schema.write_to(&self.store, &self.key, &value)?;
        self.value = value;
        Ok(())
    }

    /// Modify a copy of the current value and persist it
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails; the cached value is unchanged.
    pub fn update<F>(&mut self, f: F) -> Result<(), StoreError>
    where
        T: Clone,
        F: FnOnce(&mut T),
    {
        let mut next = self.value.clone();
        f(&mut next);
        self.set(next)
    }

    /// Re-read the stored value, picking up writes from other handles
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub fn reload(&mut self) -> Result<&T, StoreError> {
        self.value = self.schema.read_from(&self.store, &self.key)?;
        Ok(&self.value)
    }

    /// Remove the stored value and reset to the initial value
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend removal fails.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove_item(&self.key)?;
        self.value = self.schema.initial();
        Ok(())
    }

    /// Consume the cell and return its value
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Envelope, MemoryStore};
    use crate::testing::TempStore;
    use serde_json::Value;

    fn names() -> Versioned<Vec<String>> {
        Versioned::new(2, Vec::new, |data, _from| {
            data.as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_uppercase))
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    #[test]
    fn test_load_empty_store_gives_initial() {
        let store = MemoryStore::new();
        let cell = StoredCell::load(&store, "names", names()).unwrap();
        assert!(cell.get().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_persists_envelope() {
        let store = MemoryStore::new();
        let mut cell = StoredCell::load(&store, "names", names()).unwrap();
        cell.set(vec!["a".to_string()]).unwrap();

        let raw = store.get_item("names").unwrap().unwrap();
        let envelope: Envelope<Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(envelope.version, 2);
        assert_eq!(envelope.data, serde_json::json!(["a"]));
    }

    #[test]
    fn test_update_and_reload() {
        let store = MemoryStore::new();
        let mut first = StoredCell::load(&store, "names", names()).unwrap();
        let mut second = StoredCell::load(&store, "names", names()).unwrap();

        first.update(|names| names.push("x".to_string())).unwrap();
        assert!(second.get().is_empty());
        assert_eq!(second.reload().unwrap(), &vec!["x".to_string()]);
    }

    #[test]
    fn test_migrated_value_is_not_written_until_set() {
        let store = MemoryStore::new();
        store.set_item("names", r#"{"version":1,"data":["a","b"]}"#).unwrap();

        let mut cell = StoredCell::load(&store, "names", names()).unwrap();
        assert_eq!(cell.get(), &vec!["A".to_string(), "B".to_string()]);
        assert!(store.get_item("names").unwrap().unwrap().contains("\"version\":1"));

        let value = cell.get().clone();
        cell.set(value).unwrap();
        assert!(store.get_item("names").unwrap().unwrap().contains("\"version\":2"));
    }

    #[test]
    fn test_clear_removes_key() {
        let store = MemoryStore::new();
        let mut cell = StoredCell::load(&store, "names", names()).unwrap();
        cell.set(vec!["a".to_string()]).unwrap();
        cell.clear().unwrap();
        assert!(cell.get().is_empty());
        assert_eq!(store.get_item("names").unwrap(), None);
    }

    #[test]
    fn test_cell_over_sled_survives_reopen() {
        let temp = TempStore::new();
        {
            let mut cell = StoredCell::load(temp.store(), "names", names()).unwrap();
            cell.set(vec!["kept".to_string()]).unwrap();
        }
        let cell = StoredCell::load(temp.store(), "names", names()).unwrap();
        assert_eq!(cell.into_inner(), vec!["kept".to_string()]);
    }
}
