//! Connection profiles

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::keys::DEFAULT_TEMPLATE;

/// Default encoder quality for converted uploads
pub const DEFAULT_QUALITY: u8 = 80;

/// Name given to the profile created from defaults or legacy settings
pub const DEFAULT_PROFILE_NAME: &str = "default";

fn default_key_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

const fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

/// Accept strings, numbers and booleans; anything else becomes empty
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Accept `true`/`false` and their usual string and numeric spellings
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        _ => false,
    })
}

/// Accept a number or numeric string, clamped to 0..=100
fn lenient_quality<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(raw
        .filter(|q| q.is_finite())
        .map_or(DEFAULT_QUALITY, |q| q.round().clamp(0.0, 100.0) as u8))
}

/// Options of one storage profile
///
/// Deserialization never fails on an object: unknown keys are ignored,
/// missing keys take their defaults, and mistyped values are coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileOptions {
    #[serde(deserialize_with = "lenient_string")]
    pub endpoint: String,
    #[serde(deserialize_with = "lenient_string")]
    pub region: String,
    #[serde(deserialize_with = "lenient_string")]
    pub bucket: String,
    #[serde(deserialize_with = "lenient_string")]
    pub access_key_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub secret_access_key: String,
    /// Base URL objects are served from
    #[serde(deserialize_with = "lenient_string")]
    pub public_url: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub force_path_style: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub key_template: String,
    /// Target image format for uploads; empty keeps the original
    #[serde(deserialize_with = "lenient_string")]
    pub convert_to: String,
    #[serde(deserialize_with = "lenient_quality")]
    pub quality: u8,
}

impl ProfileOptions {
    /// Option names as they appear in stored documents
    pub const FIELDS: &'static [&'static str] = &[
        "endpoint",
        "region",
        "bucket",
        "accessKeyId",
        "secretAccessKey",
        "publicUrl",
        "forcePathStyle",
        "keyTemplate",
        "convertTo",
        "quality",
    ];

    /// Options read from a JSON object, or `None` for anything else
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .as_object()
            .and_then(|_| Self::deserialize(value).ok())
    }

    /// Whether `value` is an object carrying at least one known option
    #[must_use]
    pub fn looks_like_options(value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|fields| Self::FIELDS.iter().any(|name| fields.contains_key(*name)))
    }

    /// The conversion target, if any
    #[must_use]
    pub fn convert_to(&self) -> Option<&str> {
        Some(self.convert_to.trim()).filter(|ext| !ext.is_empty())
    }

    /// Secret key with all but the last four characters hidden
    #[must_use]
    pub fn masked_secret(&self) -> String {
        let chars: Vec<char> = self.secret_access_key.chars().collect();
        let visible = chars.len().saturating_sub(4);
        chars
            .iter()
            .enumerate()
            .map(|(i, c)| if i < visible { '*' } else { *c })
            .collect()
    }
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: String::new(),
            bucket: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_url: String::new(),
            force_path_style: false,
            key_template: default_key_template(),
            convert_to: String::new(),
            quality: default_quality(),
        }
    }
}

/// Named profiles and the index of the active one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileList {
    pub list: Vec<(String, ProfileOptions)>,
    pub current: usize,
}

impl ProfileList {
    /// A list holding one profile
    #[must_use]
    pub fn single(name: impl Into<String>, options: ProfileOptions) -> Self {
        Self {
            list: vec![(name.into(), options)],
            current: 0,
        }
    }

    /// Whether `current` points into a non-empty list
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.current < self.list.len()
    }

    /// Name and options of the active profile
    #[must_use]
    pub fn active(&self) -> Option<(&str, &ProfileOptions)> {
        self.list
            .get(self.current)
            .map(|(name, options)| (name.as_str(), options))
    }

    /// Index of the profile called `name`
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.list.iter().position(|(n, _)| n == name)
    }
}

impl Default for ProfileList {
    fn default() -> Self {
        Self::single(DEFAULT_PROFILE_NAME, ProfileOptions::default())
    }
}

impl fmt::Display for ProfileList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, options)) in self.list.iter().enumerate() {
            let marker = if i == self.current { '*' } else { ' ' };
            writeln!(f, "{marker} {name} ({} @ {})", options.bucket, options.endpoint)?;
        }
        Ok(())
    }
}
