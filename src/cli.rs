//! Command-line interface definitions and parsing
//!
//! This module defines the complete CLI structure for bucketview using the
//! `clap` crate, along with the value parsers that turn flags into core types.
//!
//! # Commands
//!
//! - **filter**: Filter, search and sort a bucket listing
//! - **layout**: Pack aspect ratios into justified rows
//! - **key**: Render an upload key for a file name
//! - **settings**: Inspect, migrate or reset stored profiles
//! - **config**: Show the configuration or its location
//!
//! # Examples
//!
//! ```
//! use bucketview::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["bucketview", "key", "cat.png", "--ext", "webp"]);
//! assert!(matches!(cli.command, Commands::Key { .. }));
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::filters::{DatePreset, DateRangeSpec, FilterCriteria, SortBy, SortOrder, codec};
use crate::layout::LayoutItem;

/// Parse a layout item: an aspect ratio (`1.5`) or a pixel size (`1920x1080`)
///
/// # Errors
///
/// Returns a message if the value is neither form.
pub fn parse_layout_item(value: &str) -> Result<LayoutItem, String> {
    if let Some((width, height)) = value.split_once('x') {
        let width = width.trim().parse::<u32>().map_err(|e| format!("invalid width in '{value}': {e}"))?;
        let height = height.trim().parse::<u32>().map_err(|e| format!("invalid height in '{value}': {e}"))?;
        return Ok(LayoutItem::from_size(width, height));
    }
    value
        .trim()
        .parse::<f64>()
        .map(LayoutItem::new)
        .map_err(|e| format!("invalid aspect ratio '{value}': {e}"))
}

/// Parse `--range`: a preset tag (`7d`, `all`, ...) or `START..END` with
/// either side optional, dates as `YYYY-MM-DD`
///
/// # Errors
///
/// Returns a message naming the accepted forms when the value matches none.
pub fn parse_date_range(value: &str) -> Result<DateRangeSpec, String> {
    if let Some(preset) = DatePreset::from_tag(value) {
        return Ok(DateRangeSpec::Preset(preset));
    }

    let (start, end) = value.split_once("..").ok_or_else(|| {
        let tags: Vec<&str> = DatePreset::all().into_iter().map(DatePreset::tag).collect();
        format!("expected one of {} or START..END", tags.join(", "))
    })?;

    let date = |side: &str| -> Result<Option<NaiveDate>, String> {
        let side = side.trim();
        if side.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(side, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| format!("invalid date '{side}': {e}"))
    };

    Ok(DateRangeSpec::Explicit {
        start: date(start)?,
        end: date(end)?,
    })
}

/// Parse `--sort-by`
///
/// # Errors
///
/// Returns a message if the value is not `key` or `date`.
pub fn parse_sort_by(value: &str) -> Result<SortBy, String> {
    SortBy::from_param(value).ok_or_else(|| format!("expected 'key' or 'date', got '{value}'"))
}

/// Parse `--order`
///
/// # Errors
///
/// Returns a message if the value is not `asc` or `desc`.
pub fn parse_sort_order(value: &str) -> Result<SortOrder, String> {
    SortOrder::from_param(value).ok_or_else(|| format!("expected 'asc' or 'desc', got '{value}'"))
}

/// Criteria flags of the filter command
#[derive(Args, Debug, Clone, Default)]
pub struct CriteriaArgs {
    /// Search term matched against object keys
    #[arg(short = 's', long = "search", value_name = "TERM")]
    pub search: Option<String>,

    /// Keep keys starting with this prefix (case-sensitive)
    #[arg(short = 'p', long = "prefix")]
    pub prefix: Option<String>,

    /// Date range: all, 24h, 7d, 30d, 90d, 1y, or START..END
    #[arg(short = 'r', long = "range", value_parser = parse_date_range)]
    pub range: Option<DateRangeSpec>,

    /// Sort field when not searching
    #[arg(long = "sort-by", value_parser = parse_sort_by)]
    pub sort_by: Option<SortBy>,

    /// Sort direction when not searching
    #[arg(long = "order", value_parser = parse_sort_order)]
    pub order: Option<SortOrder>,

    /// Criteria as a query string (e.g. "searchTerm=cat&dateRangeType=7d")
    #[arg(long = "query", value_name = "QUERY", conflicts_with_all = ["search", "prefix", "range", "sort_by", "order"])]
    pub query: Option<String>,
}

impl CriteriaArgs {
    /// Whether any criteria flag was given
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.prefix.is_none()
            && self.range.is_none()
            && self.sort_by.is_none()
            && self.order.is_none()
            && self.query.is_none()
    }

    /// Criteria from the flags, or `None` when no flag was given
    #[must_use]
    pub fn criteria(&self) -> Option<FilterCriteria> {
        if self.is_empty() {
            return None;
        }

        if let Some(query) = &self.query {
            return Some(codec::decode(&codec::from_query_string(query)));
        }

        let defaults = FilterCriteria::default();
        Some(FilterCriteria {
            search_term: self.search.clone().unwrap_or_default(),
            prefix: self.prefix.clone(),
            date_range: self.range.unwrap_or(defaults.date_range),
            sort_by: self.sort_by.unwrap_or(defaults.sort_by),
            sort_order: self.order.unwrap_or(defaults.sort_order),
        })
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Filter, search and sort a JSON listing of photo records
    #[command(visible_alias = "f")]
    Filter {
        /// JSON array of {key, lastModified, url}; "-" reads stdin
        #[arg(value_name = "LISTING")]
        listing: PathBuf,

        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Use fuzzy search (overrides config)
        #[arg(long = "fuzzy")]
        fuzzy: bool,

        /// Fuzzy tolerance from 0 (exact) to 1 (anything)
        #[arg(long = "threshold", value_name = "T")]
        threshold: Option<f64>,

        /// Remember the given criteria for later runs
        #[arg(long = "save")]
        save: bool,

        /// Forget remembered criteria before filtering
        #[arg(long = "reset", conflicts_with = "save")]
        reset: bool,

        /// Print the criteria as a query string
        #[arg(long = "print-query")]
        print_query: bool,

        /// Also lay out the matches in a container this wide
        #[arg(short = 'w', long = "width")]
        width: Option<f64>,
    },

    /// Lay out images of the given aspect ratios
    #[command(visible_alias = "l")]
    Layout {
        /// Aspect ratios (width / height) or pixel sizes (WxH); invalid ones use the default
        #[arg(value_name = "ITEM", num_args = 1.., allow_negative_numbers = true, value_parser = parse_layout_item)]
        items: Vec<LayoutItem>,

        /// Container width
        #[arg(short = 'w', long = "width")]
        width: f64,

        /// Gap between items (overrides config)
        #[arg(long = "gap")]
        gap: Option<f64>,

        /// Target row height (overrides config)
        #[arg(long = "row-height")]
        row_height: Option<f64>,
    },

    /// Render the upload key for a file name
    #[command(visible_alias = "k")]
    Key {
        /// Original file name
        #[arg(value_name = "FILENAME")]
        filename: String,

        /// Key template (overrides config and the active profile)
        #[arg(short = 't', long = "template")]
        template: Option<String>,

        /// Extension after conversion
        #[arg(short = 'e', long = "ext")]
        ext: Option<String>,
    },

    /// Inspect and maintain stored settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommands {
    /// List profiles and the stored format
    Show,

    /// Rewrite stored settings at the current version
    Migrate {
        /// Do not ask for confirmation
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Forget stored settings
    Reset {
        /// Do not ask for confirmation
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Print the config file location
    Path,
}

#[derive(Parser, Debug)]
#[command(name = "bucketview")]
#[command(about = "Gallery tools for S3-compatible image buckets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
