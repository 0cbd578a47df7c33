//! Storage profile settings
//!
//! Profiles are persisted as a versioned document and upgraded from the two
//! earlier layouts on load. See [`migrate`] for the accepted formats.

pub mod migrate;
pub mod store;
pub mod types;

pub use migrate::{CURRENT_SENTINEL, SETTINGS_VERSION, migrate};
pub use store::{SETTINGS_KEY, SettingsStore, StoredSettings, settings_schema};
pub use types::{DEFAULT_PROFILE_NAME, DEFAULT_QUALITY, ProfileList, ProfileOptions};
