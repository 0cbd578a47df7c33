//! Versioned envelopes
//!
//! Every persisted value is wrapped as `{"version": n, "data": ...}`. Reading
//! goes through [`Versioned::read`], which never fails: malformed envelopes,
//! data that no longer fits the schema, and older versions are all turned
//! into a usable value here.

use super::error::{StoreError, ValidationError};
use super::kv::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// `data` value marking an envelope that was reserved but never written
pub const UNINITIALIZED: &str = "__uninitialized__";

/// The unit written to storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<D> {
    /// Schema version the writer was built against
    pub version: u32,
    /// The payload
    pub data: D,
}

impl Envelope<Value> {
    /// Envelope whose payload is the uninitialized sentinel
    #[must_use]
    pub fn uninitialized(version: u32) -> Self {
        Self {
            version,
            data: Value::String(UNINITIALIZED.to_string()),
        }
    }

    /// Whether the payload is the uninitialized sentinel
    #[must_use]
    pub fn is_uninitialized(&self) -> bool {
        self.data.as_str() == Some(UNINITIALIZED)
    }
}

type InitialFn<T> = Box<dyn Fn() -> T + Send + Sync>;
type MigrateFn<T> = Box<dyn Fn(Value, u32) -> T + Send + Sync>;
type ValidateFn<T> = Box<dyn Fn(&Value) -> Result<T, ValidationError> + Send + Sync>;
type CorruptStorageFn<T> = Box<dyn Fn(&str) -> Option<T> + Send + Sync>;
type CorruptDataFn<T> = Box<dyn Fn(&Value) -> Option<T> + Send + Sync>;

/// Schema description for one persisted value
///
/// Holds the current version, the initial value, the migration function and
/// the validator. Migration functions receive the raw payload and the version
/// it was written with; composing several steps (v1 to v2 to v3) is their own
/// job.
///
/// # Examples
///
/// ```
/// use bucketview::store::Versioned;
///
/// let schema = Versioned::new(2, || 0_u32, |data, _from| {
///     data.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0)
/// });
/// assert_eq!(schema.read(Some(r#"{"version":1,"data":7}"#)), 7);
/// assert_eq!(schema.read(Some("not json")), 0);
/// ```
pub struct Versioned<T> {
    version: u32,
    initial: InitialFn<T>,
    migrate: MigrateFn<T>,
    validate: ValidateFn<T>,
    on_corrupt_storage: Option<CorruptStorageFn<T>>,
    on_corrupt_data: Option<CorruptDataFn<T>>,
}

impl<T> Versioned<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Create a schema at `version` with serde deserialization as validator
    pub fn new<I, M>(version: u32, initial: I, migrate: M) -> Self
    where
        I: Fn() -> T + Send + Sync + 'static,
        M: Fn(Value, u32) -> T + Send + Sync + 'static,
    {
        Self {
            version,
            initial: Box::new(initial),
            migrate: Box::new(migrate),
            validate: Box::new(|data: &Value| T::deserialize(data).map_err(ValidationError::from)),
            on_corrupt_storage: None,
            on_corrupt_data: None,
        }
    }

    /// Add a check that runs after deserialization succeeds
    #[must_use]
    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validate = Box::new(move |data: &Value| -> Result<T, ValidationError> {
            let value = T::deserialize(data)?;
            check(&value)?;
            Ok(value)
        });
        self
    }

    /// Hook for raw storage that is not an envelope at all
    ///
    /// Returning `None` falls back to the initial value.
    #[must_use]
    pub fn on_corrupt_storage<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        self.on_corrupt_storage = Some(Box::new(hook));
        self
    }

    /// Hook for a current-version envelope whose data fails validation
    ///
    /// Returning `None` falls back to the initial value.
    #[must_use]
    pub fn on_corrupt_data<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Option<T> + Send + Sync + 'static,
    {
        self.on_corrupt_data = Some(Box::new(hook));
        self
    }

    /// The version stamped on every write
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// A fresh initial value
    #[must_use]
    pub fn initial(&self) -> T {
        (self.initial)()
    }

    /// Turn raw stored text into a value of the current schema
    ///
    /// `None` (nothing stored) yields the initial value.
    #[must_use]
    pub fn read(&self, raw: Option<&str>) -> T {
        let Some(raw) = raw else {
            return self.initial();
        };

        let envelope = match serde_json::from_str::<Envelope<Value>>(raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error = %err, "stored envelope is malformed, recovering");
                return self
                    .on_corrupt_storage
                    .as_ref()
                    .and_then(|hook| hook(raw))
                    .unwrap_or_else(|| self.initial());
            }
        };

        if envelope.is_uninitialized() {
            return self.initial();
        }

        if envelope.version != self.version {
            debug!(from = envelope.version, to = self.version, "migrating stored data");
            return (self.migrate)(envelope.data, envelope.version);
        }

        match (self.validate)(&envelope.data) {
            Ok(value) => value,
            Err(err) => {
                warn!(version = self.version, error = %err, "stored data failed validation, recovering");
                self.on_corrupt_data
                    .as_ref()
                    .and_then(|hook| hook(&envelope.data))
                    .unwrap_or_else(|| self.initial())
            }
        }
    }

    /// Wrap a value in an envelope stamped with the current version
    #[must_use]
    pub const fn envelope<'a>(&self, value: &'a T) -> Envelope<&'a T> {
        Envelope {
            version: self.version,
            data: value,
        }
    }

    /// Serialize a value into envelope text
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the value cannot be encoded as JSON.
    pub fn write(&self, value: &T) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.envelope(value))?)
    }

    /// Read the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only if the backend itself fails.
    pub fn read_from<S: KeyValueStore + ?Sized>(&self, store: &S, key: &str) -> Result<T, StoreError> {
        let raw = store.get_item(key)?;
        Ok(self.read(raw.as_deref()))
    }

    /// Replace the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the backend write fails.
    pub fn write_to<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let text = self.write(value)?;
        store.set_item(key, &text)
    }
}

impl<T> std::fmt::Debug for Versioned<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Versioned")
            .field("version", &self.version)
            .field("on_corrupt_storage", &self.on_corrupt_storage.is_some())
            .field("on_corrupt_data", &self.on_corrupt_data.is_some())
            .finish_non_exhaustive()
    }
}
