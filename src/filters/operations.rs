//! Persisted filter criteria
//!
//! The current criteria are kept in the local store using the same compact
//! flat-parameter form as the URL query string, so both representations agree
//! on which fields are written.

use super::codec::{self, FlatParams};
use super::types::FilterCriteria;
use crate::store::{KeyValueStore, StoreError, StoredCell, Versioned};
use serde_json::Value;

/// Storage key of the current criteria
pub const CRITERIA_KEY: &str = "gallery-filter";

/// Schema version of the stored criteria
pub const CRITERIA_VERSION: u32 = 1;

/// Keep the string-valued entries of a JSON object, dropping the rest
fn salvage(data: &Value) -> FlatParams {
    data.as_object()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Schema for the stored flat parameters
#[must_use]
pub fn criteria_schema() -> Versioned<FlatParams> {
    Versioned::new(CRITERIA_VERSION, FlatParams::new, |data, _from| salvage(&data))
        .on_corrupt_data(|data| Some(salvage(data)))
}

/// Current filter criteria backed by a key-value store
///
/// # Examples
///
/// ```
/// use bucketview::filters::{CriteriaStore, FilterCriteria};
/// use bucketview::store::MemoryStore;
///
/// let store = MemoryStore::new();
/// let mut criteria = CriteriaStore::open(&store).unwrap();
/// criteria.save(&FilterCriteria::builder().prefix("2024/").build()).unwrap();
///
/// let reopened = CriteriaStore::open(&store).unwrap();
/// assert_eq!(reopened.current().prefix.as_deref(), Some("2024/"));
/// ```
pub struct CriteriaStore<S> {
    cell: StoredCell<FlatParams, S>,
}

impl<S: KeyValueStore> CriteriaStore<S> {
    /// Load the stored criteria
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub fn open(store: S) -> Result<Self, StoreError> {
        Ok(Self {
            cell: StoredCell::load(store, CRITERIA_KEY, criteria_schema())?,
        })
    }

    /// The stored criteria
    #[must_use]
    pub fn current(&self) -> FilterCriteria {
        codec::decode(self.cell.get())
    }

    /// The stored criteria as a query string
    #[must_use]
    pub fn query_string(&self) -> String {
        codec::to_query_string(self.cell.get())
    }

    /// Replace the stored criteria
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend write fails.
    pub fn save(&mut self, criteria: &FilterCriteria) -> Result<(), StoreError> {
        self.cell.set(codec::encode(criteria))
    }

    /// Forget the stored criteria
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend removal fails.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.cell.clear()
    }
}
