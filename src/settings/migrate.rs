//! Upgrading stored settings to the current profile list
//!
//! Three generations of the settings document exist:
//!
//! 1. A flat options blob. It may be an object, a JSON string holding the
//!    object, or a URL-encoded string.
//! 2. `{"options": {...}, "profiles": [[name, options | "__current__"], ...]}`
//!    where the active profile holds a sentinel and the live options sit in
//!    the separate `options` document.
//! 3. `{"list": [[name, options], ...], "current": index}`.
//!
//! Migration is total: anything that cannot be read becomes the default list.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::types::{DEFAULT_PROFILE_NAME, ProfileList, ProfileOptions};

/// Version of the profile list written today
pub const SETTINGS_VERSION: u32 = 3;

/// Marks the profile whose options live in the version 2 `options` document
pub const CURRENT_SENTINEL: &str = "__current__";

/// Nesting limit for strings that hold JSON
const MAX_ENCODING_DEPTH: usize = 3;

/// Convert settings stored at `from` into the current profile list
///
/// # Examples
///
/// ```
/// use bucketview::settings::migrate;
/// use serde_json::json;
///
/// let v2 = json!({
///     "options": {"bucket": "live"},
///     "profiles": [["work", {"bucket": "old"}], ["home", "__current__"]],
/// });
/// let list = migrate(v2, 2);
/// assert_eq!(list.current, 1);
/// assert_eq!(list.list[1].1.bucket, "live");
/// ```
#[must_use]
pub fn migrate(data: Value, from: u32) -> ProfileList {
    let migrated = match from {
        1 => from_v1(&data),
        2 => from_v2(&data),
        SETTINGS_VERSION => from_v3(&data),
        _ => None,
    };

    migrated.unwrap_or_else(|| {
        info!(from, "settings could not be migrated, using the default profile");
        ProfileList::default()
    })
}

/// Read a version 1 blob in any of its encodings
#[must_use]
pub fn from_v1(data: &Value) -> Option<ProfileList> {
    let options = legacy_options(data, MAX_ENCODING_DEPTH)?;
    debug!(bucket = %options.bucket, "adopted version 1 settings");
    Some(ProfileList::single(DEFAULT_PROFILE_NAME, options))
}

fn legacy_options(data: &Value, depth: usize) -> Option<ProfileOptions> {
    match data {
        Value::Object(_) if ProfileOptions::looks_like_options(data) => ProfileOptions::from_value(data),
        Value::String(text) if depth > 0 => match serde_json::from_str::<Value>(text) {
            Ok(inner) => legacy_options(&inner, depth - 1),
            Err(_) => url_encoded_options(text),
        },
        _ => None,
    }
}

fn url_encoded_options(text: &str) -> Option<ProfileOptions> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(text.trim_start_matches('?')).ok()?;
    let object: Map<String, Value> = pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    let value = Value::Object(object);
    if ProfileOptions::looks_like_options(&value) {
        ProfileOptions::from_value(&value)
    } else {
        None
    }
}

/// Splice the live options into the sentinel slot of a version 2 document
#[must_use]
pub fn from_v2(data: &Value) -> Option<ProfileList> {
    let document = data.as_object()?;
    let live = document
        .get("options")
        .and_then(ProfileOptions::from_value)
        .unwrap_or_default();

    let mut list = Vec::new();
    let mut sentinel_slot = None;
    for entry in document.get("profiles").and_then(Value::as_array).into_iter().flatten() {
        let Some([name, options]) = entry.as_array().map(Vec::as_slice) else {
            continue;
        };
        let Some(name) = name.as_str() else {
            continue;
        };

        let options = if options.as_str() == Some(CURRENT_SENTINEL) {
            sentinel_slot.get_or_insert(list.len());
            live.clone()
        } else {
            ProfileOptions::from_value(options).unwrap_or_default()
        };
        list.push((name.to_string(), options));
    }

    if list.is_empty() {
        return document
            .get("options")
            .filter(|options| options.is_object())
            .map(|_| ProfileList::single(DEFAULT_PROFILE_NAME, live));
    }

    let current = document
        .get("current")
        .and_then(Value::as_u64)
        .and_then(|index| usize::try_from(index).ok())
        .filter(|index| *index < list.len())
        .or(sentinel_slot)
        .unwrap_or(0);

    Some(ProfileList { list, current })
}

/// Re-read a current-version document, repairing an out-of-range index
#[must_use]
pub fn from_v3(data: &Value) -> Option<ProfileList> {
    let document = data.as_object()?;
    let list: Vec<(String, ProfileOptions)> = document
        .get("list")?
        .as_array()?
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_array()?;
            let name = entry.first()?.as_str()?;
            let options = entry.get(1).and_then(ProfileOptions::from_value)?;
            Some((name.to_string(), options))
        })
        .collect();

    if list.is_empty() {
        return None;
    }

    let current = document
        .get("current")
        .and_then(Value::as_u64)
        .and_then(|index| usize::try_from(index).ok())
        .filter(|index| *index < list.len())
        .unwrap_or(0);

    Some(ProfileList { list, current })
}
