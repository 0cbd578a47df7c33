//! Photo set lifecycle over an object store
//!
//! [`Gallery`] owns the list of photos currently in a bucket. It refreshes the
//! list from an [`ObjectStore`], keeps it in step with uploads and deletes, and
//! hands filtered views to the caller.

pub mod client;
pub mod error;
pub mod memory;
pub mod photos;

pub use client::{ObjectInfo, ObjectStore};
pub use error::GalleryError;
pub use memory::MemoryObjectStore;
pub use photos::{Gallery, public_url};
