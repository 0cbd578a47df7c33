//! The photo set shown in the gallery

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use super::client::{ObjectInfo, ObjectStore};
use super::error::GalleryError;
use crate::PhotoRecord;
use crate::filters::{FilterCriteria, FilterEngine};
use crate::keys::{DEFAULT_TEMPLATE, KeyTemplateContext, UlidGenerator, render};

/// Join a public base URL and an object key
#[must_use]
pub fn public_url(base: &str, key: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}/{key}")
    }
}

/// All photos of one bucket, with upload and delete kept in sync
///
/// The set is replaced wholesale on [`Gallery::refresh`]. A failed request
/// leaves it untouched.
///
/// # Examples
///
/// ```
/// use bucketview::filters::FilterCriteria;
/// use bucketview::gallery::{Gallery, MemoryObjectStore};
/// use chrono::Utc;
///
/// let mut gallery = Gallery::new(MemoryObjectStore::new(), "https://cdn.example.com");
/// let context = gallery.prepare("cat.jpg", Utc::now());
/// let uploaded = gallery.upload(&context, b"...").unwrap();
/// assert!(uploaded.url.starts_with("https://cdn.example.com/i/"));
/// assert_eq!(gallery.view(&FilterCriteria::default(), Utc::now()).len(), 1);
/// ```
#[derive(Debug)]
pub struct Gallery<C, R = StdRng> {
    client: C,
    base_url: String,
    template: String,
    convert_to: Option<String>,
    engine: FilterEngine,
    ids: UlidGenerator<R>,
    photos: Vec<PhotoRecord>,
}

impl<C: ObjectStore> Gallery<C> {
    /// Empty gallery over `client`, serving objects from `base_url`
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self::with_ids(client, base_url, UlidGenerator::new())
    }
}

impl<C: ObjectStore, R: RngCore> Gallery<C, R> {
    /// Empty gallery using the given identifier source
    pub fn with_ids(client: C, base_url: impl Into<String>, ids: UlidGenerator<R>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            template: DEFAULT_TEMPLATE.to_string(),
            convert_to: None,
            engine: FilterEngine::default(),
            ids,
            photos: Vec::new(),
        }
    }

    /// Key template for uploads
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Extension uploads are converted to
    #[must_use]
    pub fn convert_to(mut self, extension: Option<&str>) -> Self {
        self.convert_to = extension.map(str::to_string);
        self
    }

    /// Engine used by [`Gallery::view`]
    #[must_use]
    pub const fn engine(mut self, engine: FilterEngine) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The current photo set, in listing order
    #[must_use]
    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    fn record(&self, info: ObjectInfo) -> PhotoRecord {
        let url = public_url(&self.base_url, &info.key);
        PhotoRecord::new(info.key, info.last_modified, url)
    }

    /// Replace the photo set with a fresh listing
    ///
    /// # Errors
    ///
    /// Returns `GalleryError` if listing fails; the set is left unchanged.
    pub fn refresh(&mut self) -> Result<usize, GalleryError> {
        let listing = self.client.list()?;
        self.photos = listing.into_iter().map(|info| self.record(info)).collect();
        debug!(count = self.photos.len(), "refreshed photo set");
        Ok(self.photos.len())
    }

    /// Delete `key` from the store, then from the set
    ///
    /// # Errors
    ///
    /// Returns `GalleryError` if the store refuses; the set is left unchanged.
    pub fn delete(&mut self, key: &str) -> Result<(), GalleryError> {
        self.client.delete(key)?;
        self.photos.retain(|photo| photo.key != key);
        debug!(key, "deleted photo");
        Ok(())
    }

    /// Bind key tokens for a file being added
    pub fn prepare(&mut self, file_name: &str, now: DateTime<Utc>) -> KeyTemplateContext {
        let mut context = KeyTemplateContext::bind(file_name, now, &mut self.ids);
        context.set_target_extension(self.convert_to.as_deref());
        context
    }

    /// Key an upload with `context` would be stored under
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::InvalidKey` for an empty key or one starting
    /// with `/`.
    pub fn key_for(&self, context: &KeyTemplateContext) -> Result<String, GalleryError> {
        let key = render(&self.template, context);
        if key.trim().is_empty() || key.starts_with('/') {
            return Err(GalleryError::InvalidKey(key));
        }
        Ok(key)
    }

    /// Store `body` under the key rendered from `context` and add it to the set
    ///
    /// An existing record with the same key is replaced.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError` if the key is invalid or the upload fails.
    pub fn upload(&mut self, context: &KeyTemplateContext, body: &[u8]) -> Result<PhotoRecord, GalleryError> {
        let key = self.key_for(context)?;
        self.client.put(&key, body)?;

        // The put is confirmed; metadata is best effort
        let head = self.client.head(&key).unwrap_or_else(|err| {
            warn!(%key, error = %err, "metadata lookup failed after upload");
            None
        });
        let info = head.unwrap_or_else(|| ObjectInfo {
            key: key.clone(),
            last_modified: context.created(),
            size: body.len() as u64,
        });
        let record = self.record(info);

        self.photos.retain(|photo| photo.key != record.key);
        self.photos.push(record.clone());
        debug!(key = %record.key, bytes = body.len(), "uploaded photo");
        Ok(record)
    }

    /// The photo set narrowed and ordered by `criteria`
    #[must_use]
    pub fn view(&self, criteria: &FilterCriteria, now: DateTime<Utc>) -> Vec<PhotoRecord> {
        self.engine.apply(&self.photos, criteria, now)
    }
}
