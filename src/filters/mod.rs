//! Gallery filtering, searching and sorting
//!
//! This module narrows the photo list shown in the gallery and keeps the
//! active criteria in sync with URL query strings and local storage.
//!
//! # Features
//!
//! - **Prefix and date filters**: case-sensitive key prefix, preset or explicit
//!   date ranges
//! - **Search**: exact substring or fuzzy matching, best match first
//! - **Sort**: by key or date in either direction when no search is active
//! - **Codec**: compact flat parameters shared by query strings and storage
//!
//! # Examples
//!
//! ```
//! use bucketview::PhotoRecord;
//! use bucketview::filters::{FilterEngine, SearchOptions, codec};
//! use chrono::Utc;
//!
//! let photos = vec![
//!     PhotoRecord::new("trips/sunset.jpg", Utc::now(), "https://cdn/trips/sunset.jpg"),
//!     PhotoRecord::new("trips/moon.jpg", Utc::now(), "https://cdn/trips/moon.jpg"),
//! ];
//!
//! let criteria = codec::decode(&codec::from_query_string("?searchTerm=snset"));
//! let engine = FilterEngine::new(SearchOptions::fuzzy(0.8));
//! let found = engine.apply(&photos, &criteria, Utc::now());
//! assert_eq!(found[0].key, "trips/sunset.jpg");
//! ```

pub mod codec;
pub mod engine;
pub mod fuzzy;
pub mod operations;
pub mod types;

pub use codec::{FlatParams, decode, encode};
pub use engine::FilterEngine;
pub use operations::CriteriaStore;
pub use types::{
    DateBounds, DatePreset, DateRangeSpec, FilterCriteria, FilterCriteriaBuilder, SearchMode,
    SearchOptions, SortBy, SortOrder,
};
