//! Stored settings with migration on load

use serde_json::Value;
use std::fmt;

use super::migrate::{SETTINGS_VERSION, from_v1, from_v3, migrate};
use super::types::{ProfileList, ProfileOptions};
use crate::store::{Envelope, KeyValueStore, StoreError, StoredCell, ValidationError, Versioned};

/// Storage key of the profile list
pub const SETTINGS_KEY: &str = "settings";

/// Read settings written before they were wrapped in an envelope
fn adopt_legacy(raw: &str) -> Option<ProfileList> {
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    from_v1(&value)
}

fn check(list: &ProfileList) -> Result<(), ValidationError> {
    if list.list.is_empty() {
        Err(ValidationError::new("profile list is empty"))
    } else if !list.is_valid() {
        Err(ValidationError::new(format!(
            "current profile {} is out of range for {} profiles",
            list.current,
            list.list.len()
        )))
    } else {
        Ok(())
    }
}

/// Schema for the stored profile list
#[must_use]
pub fn settings_schema() -> Versioned<ProfileList> {
    Versioned::new(SETTINGS_VERSION, ProfileList::default, migrate)
        .with_check(check)
        .on_corrupt_data(from_v3)
        .on_corrupt_storage(adopt_legacy)
}

/// What is currently stored under [`SETTINGS_KEY`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredSettings {
    /// Nothing stored yet
    Missing,
    /// Stored at the current version
    Current,
    /// Stored at an older (or unknown) version
    Outdated(u32),
    /// Stored without an envelope by an old release
    Legacy,
    /// Present but unreadable; loads as the default profile
    Unreadable,
}

impl StoredSettings {
    /// Classify raw stored text
    #[must_use]
    pub fn inspect(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Missing;
        };

        match serde_json::from_str::<Envelope<Value>>(raw) {
            Ok(envelope) if envelope.is_uninitialized() => Self::Missing,
            Ok(envelope) if envelope.version == SETTINGS_VERSION => Self::Current,
            Ok(envelope) => Self::Outdated(envelope.version),
            Err(_) if adopt_legacy(raw).is_some() => Self::Legacy,
            Err(_) => Self::Unreadable,
        }
    }

    /// Whether saving would rewrite the stored document
    #[must_use]
    pub const fn needs_migration(&self) -> bool {
        matches!(self, Self::Outdated(_) | Self::Legacy | Self::Unreadable)
    }
}

impl fmt::Display for StoredSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "not stored"),
            Self::Current => write!(f, "version {SETTINGS_VERSION}"),
            Self::Outdated(version) => write!(f, "version {version}, needs migration"),
            Self::Legacy => write!(f, "legacy unversioned settings"),
            Self::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// Profile list backed by a key-value store
///
/// Loading always yields a valid list. Migrated data is only written back when
/// the list is changed or [`SettingsStore::persist`] is called.
pub struct SettingsStore<S> {
    cell: StoredCell<ProfileList, S>,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Load and migrate the stored settings
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub fn open(store: S) -> Result<Self, StoreError> {
        Ok(Self {
            cell: StoredCell::load(store, SETTINGS_KEY, settings_schema())?,
        })
    }

    /// Classify what is stored right now
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub fn stored_state(&self) -> Result<StoredSettings, StoreError> {
        let raw = self.cell.store().get_item(SETTINGS_KEY)?;
        Ok(StoredSettings::inspect(raw.as_deref()))
    }

    #[must_use]
    pub const fn profiles(&self) -> &ProfileList {
        self.cell.get()
    }

    /// Name and options of the active profile
    #[must_use]
    pub fn active(&self) -> Option<(&str, &ProfileOptions)> {
        self.cell.get().active()
    }

    /// Write the loaded list at the current version
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend write fails.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let list = self.cell.get().clone();
        self.cell.set(list)
    }

    /// Make the profile called `name` active; returns `false` if there is none
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend write fails.
    pub fn select(&mut self, name: &str) -> Result<bool, StoreError> {
        let Some(index) = self.cell.get().position(name) else {
            return Ok(false);
        };
        self.cell.update(|list| list.current = index)?;
        Ok(true)
    }

    /// Replace the options of `name`, adding the profile if it is new
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend write fails.
    pub fn upsert(&mut self, name: &str, options: ProfileOptions) -> Result<(), StoreError> {
        self.cell.update(|list| match list.position(name) {
            Some(index) => list.list[index].1 = options,
            None => list.list.push((name.to_string(), options)),
        })
    }

    /// Remove the profile called `name`
    ///
    /// The last remaining profile cannot be removed. Returns whether a profile
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend write fails.
    pub fn remove(&mut self, name: &str) -> Result<bool, StoreError> {
        let list = self.cell.get();
        let Some(index) = list.position(name).filter(|_| list.list.len() > 1) else {
            return Ok(false);
        };

        self.cell.update(|list| {
            list.list.remove(index);
            if list.current > index || list.current >= list.list.len() {
                list.current = list.current.saturating_sub(1);
            }
        })?;
        Ok(true)
    }

    /// Forget the stored settings
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend removal fails.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.cell.clear()
    }
}
