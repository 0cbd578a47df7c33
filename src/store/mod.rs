//! Versioned persistence for client state
//!
//! This module stores small JSON documents in a local key-value store and keeps
//! them readable across releases. Each value is written inside a version
//! envelope; readers migrate older payloads and recover from corrupt ones
//! instead of failing.
//!
//! # Layers
//!
//! - [`KeyValueStore`]: string get/set/remove, with [`MemoryStore`] and
//!   [`SledStore`] backends
//! - [`Versioned`]: schema, migration and recovery policy for one value
//! - [`StoredCell`]: a loaded value that is written back on every change
//!
//! # Examples
//!
//! ```
//! use bucketview::store::{KeyValueStore, MemoryStore, StoredCell, Versioned};
//!
//! let store = MemoryStore::new();
//! store.set_item("zoom", r#"{"version":1,"data":"2"}"#).unwrap();
//!
//! // Version 2 stores the zoom level as a number instead of a string
//! let schema = Versioned::new(2, || 1.0_f64, |data, _from| {
//!     data.as_str().and_then(|s| s.parse().ok()).unwrap_or(1.0)
//! });
//! let zoom = StoredCell::load(&store, "zoom", schema).unwrap();
//! assert_eq!(*zoom.get(), 2.0);
//! ```

pub mod cell;
pub mod envelope;
pub mod error;
pub mod kv;

pub use cell::StoredCell;
pub use envelope::{Envelope, UNINITIALIZED, Versioned};
pub use error::{StoreError, ValidationError};
pub use kv::{KeyValueStore, MemoryStore, SledStore};
