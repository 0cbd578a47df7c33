//! Photo filtering pipeline
//!
//! [`FilterEngine::apply`] narrows and orders a photo list in a fixed order:
//!
//! 1. key prefix
//! 2. date range
//! 3. search (exact or fuzzy) when a search term is set, otherwise sort
//!
//! Search relevance replaces the sort order; the two never combine. The
//! engine holds no state between calls and does no pagination.

use super::fuzzy;
use super::types::{DateBounds, FilterCriteria, SearchMode, SearchOptions, SortBy, SortOrder};
use crate::PhotoRecord;
use chrono::{DateTime, Utc};

/// Applies `FilterCriteria` to photo lists
///
/// # Examples
///
/// ```
/// use bucketview::PhotoRecord;
/// use bucketview::filters::{FilterCriteria, FilterEngine};
/// use chrono::Utc;
///
/// let photos = vec![
///     PhotoRecord::new("a/1.png", Utc::now(), "https://cdn/a/1.png"),
///     PhotoRecord::new("b/1.png", Utc::now(), "https://cdn/b/1.png"),
/// ];
/// let criteria = FilterCriteria::builder().prefix("a/").build();
/// let result = FilterEngine::default().apply(&photos, &criteria, Utc::now());
/// assert_eq!(result.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine {
    search: SearchOptions,
}

impl FilterEngine {
    /// Create an engine with the given search options
    #[must_use]
    pub fn new(search: SearchOptions) -> Self {
        Self {
            search: search.normalized(),
        }
    }

    /// Search options in effect
    #[must_use]
    pub const fn search_options(&self) -> SearchOptions {
        self.search
    }

    /// Filter and order `photos`, returning owned records
    #[must_use]
    pub fn apply(
        &self,
        photos: &[PhotoRecord],
        criteria: &FilterCriteria,
        now: DateTime<Utc>,
    ) -> Vec<PhotoRecord> {
        self.select(photos, criteria, now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Filter and order `photos`, returning references into the input
    #[must_use]
    pub fn select<'a>(
        &self,
        photos: &'a [PhotoRecord],
        criteria: &FilterCriteria,
        now: DateTime<Utc>,
    ) -> Vec<&'a PhotoRecord> {
        let selected = by_prefix(photos.iter(), criteria.prefix.as_deref());
        let selected = by_date(selected, &criteria.date_range.resolve(now));

        match criteria.active_search_term() {
            Some(term) => match self.search.mode {
                SearchMode::Exact => search_exact(selected, term),
                SearchMode::Fuzzy => fuzzy::search(selected, term, self.search.threshold),
            },
            None => sorted(selected, criteria.sort_by, criteria.sort_order),
        }
    }
}

/// Keep records whose key starts with `prefix` (case-sensitive)
///
/// `None` or an empty prefix keeps everything.
#[must_use]
pub fn by_prefix<'a>(
    photos: impl IntoIterator<Item = &'a PhotoRecord>,
    prefix: Option<&str>,
) -> Vec<&'a PhotoRecord> {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => photos
            .into_iter()
            .filter(|photo| photo.key.starts_with(prefix))
            .collect(),
        None => photos.into_iter().collect(),
    }
}

/// Keep records modified within `bounds` (inclusive)
///
/// A range whose start lies after its end keeps nothing.
#[must_use]
pub fn by_date<'a>(
    photos: impl IntoIterator<Item = &'a PhotoRecord>,
    bounds: &DateBounds,
) -> Vec<&'a PhotoRecord> {
    photos
        .into_iter()
        .filter(|photo| bounds.contains(photo.last_modified))
        .collect()
}

/// Keep records whose key contains `term` (case-sensitive), order unchanged
#[must_use]
pub fn search_exact<'a>(
    photos: impl IntoIterator<Item = &'a PhotoRecord>,
    term: &str,
) -> Vec<&'a PhotoRecord> {
    photos
        .into_iter()
        .filter(|photo| photo.key.contains(term))
        .collect()
}

/// Sort records by key or date in the given direction (stable)
#[must_use]
pub fn sorted<'a>(
    photos: impl IntoIterator<Item = &'a PhotoRecord>,
    sort_by: SortBy,
    order: SortOrder,
) -> Vec<&'a PhotoRecord> {
    let mut photos: Vec<&PhotoRecord> = photos.into_iter().collect();
    photos.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Key => a.key.cmp(&b.key),
            SortBy::Date => a.last_modified.cmp(&b.last_modified),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    photos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DatePreset, DateRangeSpec};
    use crate::testing::{at, keys, photo};
    use chrono::NaiveDate;

    fn now() -> DateTime<Utc> {
        at("2024-01-10T00:00:00Z")
    }

    fn library() -> Vec<PhotoRecord> {
        vec![
            photo("a/1.png", "2024-01-09T12:00:00Z"),
            photo("a/2.png", "2023-12-01T08:00:00Z"),
            photo("b/1.png", "2024-01-05T09:30:00Z"),
            photo("b/cat.jpg", "2024-01-08T17:45:00Z"),
            photo("A/3.png", "2024-01-02T00:00:00Z"),
        ]
    }

    fn run(engine: FilterEngine, criteria: &FilterCriteria) -> Vec<PhotoRecord> {
        engine.apply(&library(), criteria, now())
    }

    #[test]
    fn test_default_criteria_sorts_newest_first() {
        let result = run(FilterEngine::default(), &FilterCriteria::default());
        assert_eq!(
            keys(&result),
            vec!["a/1.png", "b/cat.jpg", "b/1.png", "A/3.png", "a/2.png"]
        );
    }

    #[test]
    fn test_sort_by_key_ascending() {
        let criteria = FilterCriteria::builder()
            .sort_by(SortBy::Key)
            .sort_order(SortOrder::Asc)
            .build();
        let result = run(FilterEngine::default(), &criteria);
        assert_eq!(
            keys(&result),
            vec!["A/3.png", "a/1.png", "a/2.png", "b/1.png", "b/cat.jpg"]
        );
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        let criteria = FilterCriteria::builder().prefix("a/").build();
        let result = run(FilterEngine::default(), &criteria);
        assert_eq!(keys(&result), vec!["a/1.png", "a/2.png"]);
    }

    #[test]
    fn test_prefix_has_no_segment_awareness() {
        let criteria = FilterCriteria::builder().prefix("b/c").build();
        let result = run(FilterEngine::default(), &criteria);
        assert_eq!(keys(&result), vec!["b/cat.jpg"]);
    }

    #[test]
    fn test_empty_prefix_is_noop() {
        let criteria = FilterCriteria::builder().prefix("").build();
        assert_eq!(run(FilterEngine::default(), &criteria).len(), 5);
    }

    #[test]
    fn test_exact_search_keeps_input_order() {
        let photos = vec![
            photo("a/1.png", "2024-01-01T00:00:00Z"),
            photo("a/2.png", "2024-01-03T00:00:00Z"),
            photo("b/1.png", "2024-01-02T00:00:00Z"),
        ];
        let criteria = FilterCriteria::builder().search_term("1").build();
        let result = FilterEngine::default().apply(&photos, &criteria, now());
        assert_eq!(keys(&result), vec!["a/1.png", "b/1.png"]);
    }

    #[test]
    fn test_exact_search_is_case_sensitive_and_trimmed() {
        let criteria = FilterCriteria::builder().search_term(" Cat ").build();
        assert!(run(FilterEngine::default(), &criteria).is_empty());

        let criteria = FilterCriteria::builder().search_term(" cat ").build();
        assert_eq!(keys(&run(FilterEngine::default(), &criteria)), vec!["b/cat.jpg"]);
    }

    #[test]
    fn test_search_ignores_sort_criteria() {
        let base = FilterCriteria::builder().search_term("png");
        let by_key = base.clone().sort_by(SortBy::Key).sort_order(SortOrder::Asc).build();
        let by_date = base.sort_by(SortBy::Date).sort_order(SortOrder::Desc).build();

        for engine in [FilterEngine::default(), FilterEngine::new(SearchOptions::fuzzy(0.5))] {
            assert_eq!(run(engine, &by_key), run(engine, &by_date));
        }
    }

    #[test]
    fn test_seven_day_preset() {
        let criteria = FilterCriteria::builder().preset(DatePreset::Last7Days).build();
        let result = run(FilterEngine::default(), &criteria);
        assert_eq!(keys(&result), vec!["a/1.png", "b/cat.jpg", "b/1.png"]);
    }

    #[test]
    fn test_inverted_explicit_range_is_empty() {
        let criteria = FilterCriteria::builder()
            .between(
                NaiveDate::from_ymd_opt(2024, 1, 9),
                NaiveDate::from_ymd_opt(2024, 1, 1),
            )
            .build();
        assert!(run(FilterEngine::default(), &criteria).is_empty());
    }

    #[test]
    fn test_unbounded_explicit_range_keeps_all() {
        let criteria = FilterCriteria::builder()
            .date_range(DateRangeSpec::Explicit { start: None, end: None })
            .build();
        assert_eq!(run(FilterEngine::default(), &criteria).len(), 5);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let criteria_list = [
            FilterCriteria::default(),
            FilterCriteria::builder().prefix("a").sort_by(SortBy::Key).build(),
            FilterCriteria::builder().search_term("1").preset(DatePreset::Last30Days).build(),
        ];
        for engine in [FilterEngine::default(), FilterEngine::new(SearchOptions::fuzzy(1.0))] {
            for criteria in &criteria_list {
                let once = engine.apply(&library(), criteria, now());
                let twice = engine.apply(&once, criteria, now());
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_longer_prefix_never_matches_more() {
        let engine = FilterEngine::default();
        for (short, long) in [("", "a"), ("a", "a/"), ("a/", "a/1"), ("b", "b/cat")] {
            let short = FilterCriteria::builder().prefix(short).build();
            let long = FilterCriteria::builder().prefix(long).build();
            assert!(run(engine, &short).len() >= run(engine, &long).len());
        }
    }

    #[test]
    fn test_empty_input() {
        let engine = FilterEngine::new(SearchOptions::fuzzy(0.3));
        let criteria = FilterCriteria::builder().search_term("x").prefix("a").build();
        assert!(engine.apply(&[], &criteria, now()).is_empty());
        assert!(engine.apply(&[], &FilterCriteria::default(), now()).is_empty());
    }
}
