//! Configuration module for bucketview
//!
//! Manages application configuration: where local state is kept, search and
//! layout defaults, and the upload key template. Configuration is stored in
//! the user's config directory and can be overridden with `BUCKETVIEW_*`
//! environment variables (`__` separates nested keys, e.g.
//! `BUCKETVIEW_SEARCH__MODE=fuzzy`).

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::filters::SearchOptions;
use crate::keys::DEFAULT_TEMPLATE;
use crate::layout::LayoutOptions;
use crate::layout::dimensions::DEFAULT_CAPACITY;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "BUCKETVIEW";

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BucketviewConfig {
    /// Directory of the local state store; defaults to the data directory
    pub store_path: Option<PathBuf>,

    /// Default search mode and fuzzy threshold
    pub search: SearchOptions,

    pub layout: LayoutOptions,

    /// Template for upload keys
    pub key_template: String,

    /// Number of image sizes remembered between runs
    pub dimension_cache_capacity: u64,

    /// Suppress informational output by default
    pub quiet: bool,
}

impl Default for BucketviewConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            search: SearchOptions::default(),
            layout: LayoutOptions::default(),
            key_template: DEFAULT_TEMPLATE.to_string(),
            dimension_cache_capacity: DEFAULT_CAPACITY,
            quiet: false,
        }
    }
}

impl BucketviewConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("bucketview").join("config.toml"))
    }

    /// Default location of the local state store
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system data directory cannot be determined.
    pub fn default_store_path() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine data directory".to_string()))?;

        Ok(data_dir.join("bucketview").join("store"))
    }

    /// Load configuration from the default file, creating it if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path` layered with environment overrides
    ///
    /// A missing file is created with defaults first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::default().save_to(path)?;
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = self.to_toml()?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// The configuration as TOML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))
    }

    /// Directory of the local state store
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no path is configured and the data directory
    /// cannot be determined.
    pub fn resolved_store_path(&self) -> Result<PathBuf, ConfigError> {
        self.store_path
            .clone()
            .map_or_else(Self::default_store_path, Ok)
    }

    /// Search options with the threshold clamped
    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        self.search.normalized()
    }
}
