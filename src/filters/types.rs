//! Filter data structures and types
//!
//! This module defines the criteria the gallery view is narrowed and ordered by:
//! - `FilterCriteria`: search term, key prefix, date range and sort order
//! - `DateRangeSpec`: a named preset or an explicit pair of calendar dates
//! - `SearchOptions`: how search terms are matched (exact or fuzzy)

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Criteria for narrowing and ordering the photo list
///
/// The default value means "no filter active": every photo, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    /// Text to search keys for (trimmed before use; empty disables search)
    pub search_term: String,

    /// Keep only keys starting with this prefix
    pub prefix: Option<String>,

    /// Keep only photos modified within this range
    pub date_range: DateRangeSpec,

    /// Sort field, used when no search term is active
    pub sort_by: SortBy,

    /// Sort direction, used when no search term is active
    pub sort_order: SortOrder,
}

impl FilterCriteria {
    /// Create a new filter criteria builder
    #[must_use]
    pub fn builder() -> FilterCriteriaBuilder {
        FilterCriteriaBuilder::default()
    }

    /// Create a new filter criteria (same as `builder().build()`)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The trimmed search term, or `None` when search is inactive
    #[must_use]
    pub fn active_search_term(&self) -> Option<&str> {
        let term = self.search_term.trim();
        (!term.is_empty()).then_some(term)
    }

    /// Whether every field holds its default value
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Builder for `FilterCriteria`
#[derive(Debug, Clone, Default)]
pub struct FilterCriteriaBuilder {
    search_term: String,
    prefix: Option<String>,
    date_range: Option<DateRangeSpec>,
    sort_by: Option<SortBy>,
    sort_order: Option<SortOrder>,
}

impl FilterCriteriaBuilder {
    /// Set the search term
    #[must_use]
    pub fn search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Set the key prefix
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the date range
    #[must_use]
    pub fn date_range(mut self, range: DateRangeSpec) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Use a named date preset
    #[must_use]
    pub fn preset(self, preset: DatePreset) -> Self {
        self.date_range(DateRangeSpec::Preset(preset))
    }

    /// Use explicit calendar bounds (either side may be open)
    #[must_use]
    pub fn between(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range(DateRangeSpec::Explicit { start, end })
    }

    /// Set the sort field
    #[must_use]
    pub const fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    /// Set the sort direction
    #[must_use]
    pub const fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Build the `FilterCriteria`
    #[must_use]
    pub fn build(self) -> FilterCriteria {
        FilterCriteria {
            search_term: self.search_term,
            prefix: self.prefix,
            date_range: self.date_range.unwrap_or_default(),
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
        }
    }
}

/// Field the photo list is sorted by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Lexicographic by key
    Key,
    /// Chronological by last-modified time
    #[default]
    Date,
}

impl SortBy {
    /// External name used in query strings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Date => "date",
        }
    }

    /// Parse an external name
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "key" => Some(Self::Key),
            "date" => Some(Self::Date),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

impl SortOrder {
    /// External name used in query strings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse an external name
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Named date ranges ending at "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePreset {
    /// No date restriction
    #[default]
    All,
    /// The last 24 hours
    Last24Hours,
    /// The last 7 days
    Last7Days,
    /// The last 30 days
    Last30Days,
    /// The last 90 days
    Last90Days,
    /// The last 365 days
    LastYear,
}

/// Preset lookup table: tag and span in hours (`None` = unbounded)
static PRESETS: [(DatePreset, &str, Option<i64>); 6] = [
    (DatePreset::All, "all", None),
    (DatePreset::Last24Hours, "24h", Some(24)),
    (DatePreset::Last7Days, "7d", Some(7 * 24)),
    (DatePreset::Last30Days, "30d", Some(30 * 24)),
    (DatePreset::Last90Days, "90d", Some(90 * 24)),
    (DatePreset::LastYear, "1y", Some(365 * 24)),
];

impl DatePreset {
    /// Every preset, in table order
    #[must_use]
    pub fn all() -> Vec<Self> {
        PRESETS.iter().map(|(preset, _, _)| *preset).collect()
    }

    fn entry(self) -> &'static (Self, &'static str, Option<i64>) {
        // The table covers every variant
        PRESETS
            .iter()
            .find(|(preset, _, _)| *preset == self)
            .unwrap_or(&PRESETS[0])
    }

    /// Tag used in query strings and storage
    #[must_use]
    pub fn tag(self) -> &'static str {
        self.entry().1
    }

    /// Look up a preset by tag
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        PRESETS
            .iter()
            .find(|(_, t, _)| *t == tag)
            .map(|(preset, _, _)| *preset)
    }

    /// Length of the range, or `None` when unbounded
    #[must_use]
    pub fn span(self) -> Option<Duration> {
        self.entry().2.map(Duration::hours)
    }

    /// Concrete bounds relative to `now`
    #[must_use]
    pub fn resolve(self, now: DateTime<Utc>) -> DateBounds {
        match self.span() {
            Some(span) => DateBounds {
                start: now.checked_sub_signed(span),
                end: Some(now),
            },
            None => DateBounds::UNBOUNDED,
        }
    }
}

/// A date range: a named preset or explicit calendar dates
///
/// Explicit bounds are inclusive whole days in UTC; `None` leaves that side
/// open, so `Explicit { start: None, end: None }` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeSpec {
    /// A named range ending at "now"
    Preset(DatePreset),
    /// Explicit first and last day
    Explicit {
        /// First day included
        start: Option<NaiveDate>,
        /// Last day included
        end: Option<NaiveDate>,
    },
}

impl Default for DateRangeSpec {
    fn default() -> Self {
        Self::Preset(DatePreset::All)
    }
}

impl DateRangeSpec {
    /// Concrete bounds relative to `now`
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> DateBounds {
        match *self {
            Self::Preset(preset) => preset.resolve(now),
            Self::Explicit { start, end } => DateBounds {
                start: start
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc()),
                end: end
                    .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
                    .map(|dt| dt.and_utc()),
            },
        }
    }
}

/// Resolved inclusive time bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    /// Earliest accepted time
    pub start: Option<DateTime<Utc>>,
    /// Latest accepted time
    pub end: Option<DateTime<Utc>>,
}

impl DateBounds {
    /// Bounds that accept every time
    pub const UNBOUNDED: Self = Self {
        start: None,
        end: None,
    };

    /// Whether `time` lies within the bounds
    #[must_use]
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| start <= time) && self.end.is_none_or(|end| time <= end)
    }

    /// Whether neither side is bounded
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// How search terms are matched against keys
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-sensitive substring match, original order kept
    #[default]
    Exact,
    /// Approximate match, best match first
    Fuzzy,
}

/// Search configuration supplied by the caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SearchOptions {
    /// Matching mode
    #[serde(default)]
    pub mode: SearchMode,

    /// Fuzzy tolerance in `[0, 1]`: 0 accepts exact matches only, 1 accepts anything
    #[serde(default = "SearchOptions::default_threshold")]
    pub threshold: f64,
}

impl SearchOptions {
    /// Default fuzzy threshold
    pub const DEFAULT_THRESHOLD: f64 = 0.4;

    const fn default_threshold() -> f64 {
        Self::DEFAULT_THRESHOLD
    }

    /// Exact substring search
    #[must_use]
    pub const fn exact() -> Self {
        Self {
            mode: SearchMode::Exact,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    /// Fuzzy search at the given threshold (clamped to `[0, 1]`)
    #[must_use]
    pub fn fuzzy(threshold: f64) -> Self {
        Self {
            mode: SearchMode::Fuzzy,
            threshold,
        }
        .normalized()
    }

    /// Copy with the threshold clamped to `[0, 1]` (NaN becomes the default)
    #[must_use]
    pub fn normalized(self) -> Self {
        let threshold = if self.threshold.is_nan() {
            Self::DEFAULT_THRESHOLD
        } else {
            self.threshold.clamp(0.0, 1.0)
        };
        Self { threshold, ..self }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::exact()
    }
}

impl std::fmt::Display for DateRangeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preset(preset) => write!(f, "{}", preset.tag()),
            Self::Explicit { start, end } => {
                let side = |d: &Option<NaiveDate>| d.map_or_else(|| "…".to_string(), |d| d.to_string());
                write!(f, "{} to {}", side(start), side(end))
            }
        }
    }
}

impl std::fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.active_search_term() {
            Some(term) => writeln!(f, "Search: {term}")?,
            None => writeln!(f, "Search: (none)")?,
        }

        if let Some(prefix) = &self.prefix {
            writeln!(f, "Prefix: {prefix}")?;
        }

        writeln!(f, "Date Range: {}", self.date_range)?;

        if self.active_search_term().is_some() {
            writeln!(f, "Order: by relevance")?;
        } else {
            writeln!(
                f,
                "Order: {} ({})",
                self.sort_by.as_str(),
                match self.sort_order {
                    SortOrder::Asc => "ASC",
                    SortOrder::Desc => "DESC",
                }
            )?;
        }

        Ok(())
    }
}
