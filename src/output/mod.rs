//! Output formatting for CLI display
//!
//! This module provides utilities for formatting output in the CLI,
//! including photo listings, layout boxes and settings profiles.

use crate::PhotoRecord;
use crate::layout::LayoutBox;
use crate::settings::{ProfileOptions, StoredSettings};
use colored::Colorize;

/// Format a photo for display
///
/// Quiet output is the bare key so it can be piped.
#[must_use]
pub fn photo_line(photo: &PhotoRecord, quiet: bool) -> String {
    if quiet {
        photo.key.clone()
    } else {
        format!(
            "  {}  {}",
            photo.key.bold(),
            photo.last_modified.format("%Y-%m-%d %H:%M").to_string().dimmed()
        )
    }
}

/// Format one laid-out box
#[must_use]
pub fn layout_line(index: usize, item: &LayoutBox, quiet: bool) -> String {
    if quiet {
        format!("{:.2} {:.2} {:.2} {:.2}", item.x, item.y, item.width, item.height)
    } else {
        format!(
            "  #{index:<3} x={:<8.2} y={:<8.2} {}",
            item.x,
            item.y,
            format!("{:.2}x{:.2}", item.width, item.height).cyan()
        )
    }
}

/// Format a settings profile, marking the active one
#[must_use]
pub fn profile_line(name: &str, options: &ProfileOptions, active: bool) -> String {
    let marker = if active { "*".green().to_string() } else { " ".to_string() };
    let bucket = if options.bucket.is_empty() {
        "(no bucket)".dimmed().to_string()
    } else {
        options.bucket.clone()
    };
    format!("{marker} {} {bucket} {}", name.bold(), options.endpoint.dimmed())
}

/// Describe the stored settings state, colored by urgency
#[must_use]
pub fn settings_state(state: StoredSettings) -> String {
    let text = state.to_string();
    match state {
        StoredSettings::Current => text.green().to_string(),
        StoredSettings::Missing => text.dimmed().to_string(),
        StoredSettings::Outdated(_) | StoredSettings::Legacy => text.yellow().to_string(),
        StoredSettings::Unreadable => text.red().to_string(),
    }
}
