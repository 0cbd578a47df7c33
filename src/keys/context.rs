//! Per-upload placeholder values

use chrono::{DateTime, Datelike, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::ulid::{Ulid, UlidGenerator};

/// Split a file name into stem and extension at the last `.`
///
/// A leading dot belongs to the name, so `.env` has no extension.
#[must_use]
pub fn split_file_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(i) => (&name[..i], &name[i + 1..]),
    }
}

/// Values substituted into a key template for one file
///
/// Time and identifier tokens are fixed when the context is bound. Only the
/// file name and extension change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTemplateContext {
    created: DateTime<Utc>,
    ulid: Ulid,
    filename: String,
    extension: String,
    target_extension: Option<String>,
}

impl KeyTemplateContext {
    /// Bind tokens for `file_name` added at `now`
    pub fn bind<R: RngCore>(file_name: &str, now: DateTime<Utc>, ids: &mut UlidGenerator<R>) -> Self {
        let ulid = ids.generate_at(now);
        let (filename, extension) = split_file_name(file_name);
        Self {
            created: now,
            ulid,
            filename: filename.to_string(),
            extension: extension.to_string(),
            target_extension: None,
        }
    }

    /// Rebind the file name after the underlying file was replaced
    ///
    /// Time and identifier tokens are left as they were.
    pub fn swap_file(&mut self, file_name: &str) {
        let (filename, extension) = split_file_name(file_name);
        self.filename = filename.to_string();
        self.extension = extension.to_string();
    }

    /// Override the extension for a format conversion (`None` restores the original)
    pub fn set_target_extension(&mut self, extension: Option<&str>) {
        self.target_extension = extension
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty());
    }

    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    #[must_use]
    pub const fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Original name without its extension
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The extension the stored object will carry
    #[must_use]
    pub fn extension(&self) -> &str {
        self.target_extension.as_deref().unwrap_or(&self.extension)
    }

    /// Value of a placeholder, or `None` if the name is unknown
    #[must_use]
    pub fn token(&self, name: &str) -> Option<String> {
        let value = match name {
            "year" => format!("{:04}", self.created.year()),
            "month" => format!("{:02}", self.created.month()),
            "day" => format!("{:02}", self.created.day()),
            "timestamp" => self.created.timestamp_millis().to_string(),
            "filename" => self.filename.clone(),
            "ext" => self.extension().to_string(),
            "ulid" => self.ulid.to_string(),
            "ulid-dayslice" | "random" => self.ulid.day_slice(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::at;

    fn context(name: &str) -> KeyTemplateContext {
        let mut ids = UlidGenerator::seeded(11);
        KeyTemplateContext::bind(name, at("2024-03-09T08:07:06.005Z"), &mut ids)
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("photo.jpg"), ("photo", "jpg"));
        assert_eq!(split_file_name("archive.tar.gz"), ("archive.tar", "gz"));
        assert_eq!(split_file_name("README"), ("README", ""));
        assert_eq!(split_file_name(".env"), (".env", ""));
        assert_eq!(split_file_name("trailing."), ("trailing", ""));
    }

    #[test]
    fn test_calendar_tokens_are_zero_padded() {
        let ctx = context("a.png");
        assert_eq!(ctx.token("year").as_deref(), Some("2024"));
        assert_eq!(ctx.token("month").as_deref(), Some("03"));
        assert_eq!(ctx.token("day").as_deref(), Some("09"));
        assert_eq!(
            ctx.token("timestamp"),
            Some(at("2024-03-09T08:07:06.005Z").timestamp_millis().to_string())
        );
    }

    #[test]
    fn test_random_is_alias_of_dayslice() {
        let ctx = context("a.png");
        assert_eq!(ctx.token("random"), ctx.token("ulid-dayslice"));
        assert_eq!(ctx.token("unknown"), None);
    }

    #[test]
    fn test_swap_file_keeps_identity() {
        let mut ctx = context("holiday.png");
        let ulid = ctx.token("ulid");
        let created = ctx.created();

        ctx.swap_file("holiday-small.webp");
        assert_eq!(ctx.filename(), "holiday-small");
        assert_eq!(ctx.extension(), "webp");
        assert_eq!(ctx.token("ulid"), ulid);
        assert_eq!(ctx.created(), created);
    }

    #[test]
    fn test_target_extension_overrides_and_restores() {
        let mut ctx = context("holiday.png");
        ctx.set_target_extension(Some(".avif"));
        assert_eq!(ctx.token("ext").as_deref(), Some("avif"));

        ctx.set_target_extension(Some(""));
        assert_eq!(ctx.extension(), "png");

        ctx.set_target_extension(Some("jpg"));
        ctx.set_target_extension(None);
        assert_eq!(ctx.extension(), "png");
    }

    #[test]
    fn test_ulid_matches_bind_time() {
        let ctx = context("a.png");
        assert_eq!(
            ctx.ulid().timestamp_ms() as i64,
            at("2024-03-09T08:07:06.005Z").timestamp_millis()
        );
    }
}
