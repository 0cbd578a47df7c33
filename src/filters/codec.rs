//! Flat parameter encoding for filter criteria
//!
//! The same flat string map backs both the shareable URL query string and the
//! locally persisted criteria. Only fields that differ from their default are
//! written, so an inactive filter encodes to an empty map.
//!
//! Field names are a compatibility surface: `searchTerm`, `prefix`,
//! `dateRangeType`, `sortBy`, `sortOrder`.
//!
//! Decoding is permissive: each field that is missing, unknown or malformed
//! falls back to its default on its own, without affecting the others.

use super::types::{DatePreset, DateRangeSpec, FilterCriteria, SortBy, SortOrder};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Flat string-keyed parameters
pub type FlatParams = BTreeMap<String, String>;

/// External field names
pub mod fields {
    /// Search term
    pub const SEARCH_TERM: &str = "searchTerm";
    /// Key prefix
    pub const PREFIX: &str = "prefix";
    /// Preset tag or JSON date pair
    pub const DATE_RANGE_TYPE: &str = "dateRangeType";
    /// Sort field
    pub const SORT_BY: &str = "sortBy";
    /// Sort direction
    pub const SORT_ORDER: &str = "sortOrder";
}

/// Encode criteria, omitting fields equal to their default
#[must_use]
pub fn encode(criteria: &FilterCriteria) -> FlatParams {
    let defaults = FilterCriteria::default();
    let mut params = FlatParams::new();

    if criteria.search_term != defaults.search_term {
        params.insert(fields::SEARCH_TERM.to_string(), criteria.search_term.clone());
    }

    if let Some(prefix) = &criteria.prefix {
        params.insert(fields::PREFIX.to_string(), prefix.clone());
    }

    if criteria.date_range != defaults.date_range {
        params.insert(
            fields::DATE_RANGE_TYPE.to_string(),
            encode_date_range(&criteria.date_range),
        );
    }

    if criteria.sort_by != defaults.sort_by {
        params.insert(fields::SORT_BY.to_string(), criteria.sort_by.as_str().to_string());
    }

    if criteria.sort_order != defaults.sort_order {
        params.insert(
            fields::SORT_ORDER.to_string(),
            criteria.sort_order.as_str().to_string(),
        );
    }

    params
}

/// Decode criteria, falling back to the default for each unusable field
#[must_use]
pub fn decode(params: &FlatParams) -> FilterCriteria {
    let defaults = FilterCriteria::default();

    FilterCriteria {
        search_term: params
            .get(fields::SEARCH_TERM)
            .cloned()
            .unwrap_or(defaults.search_term),
        prefix: params.get(fields::PREFIX).cloned(),
        date_range: params
            .get(fields::DATE_RANGE_TYPE)
            .map_or(defaults.date_range, |value| decode_date_range(value)),
        sort_by: params
            .get(fields::SORT_BY)
            .and_then(|value| SortBy::from_param(value))
            .unwrap_or(defaults.sort_by),
        sort_order: params
            .get(fields::SORT_ORDER)
            .and_then(|value| SortOrder::from_param(value))
            .unwrap_or(defaults.sort_order),
    }
}

/// Encode a date range: a preset tag, or a JSON pair of ISO dates
///
/// ```
/// use bucketview::filters::{DateRangeSpec, codec::encode_date_range};
/// use chrono::NaiveDate;
///
/// let range = DateRangeSpec::Explicit {
///     start: NaiveDate::from_ymd_opt(2024, 1, 3),
///     end: None,
/// };
/// assert_eq!(encode_date_range(&range), r#"["2024-01-03",null]"#);
/// ```
#[must_use]
pub fn encode_date_range(range: &DateRangeSpec) -> String {
    match range {
        DateRangeSpec::Preset(preset) => preset.tag().to_string(),
        DateRangeSpec::Explicit { start, end } => {
            let pair = (start.map(|d| d.to_string()), end.map(|d| d.to_string()));
            serde_json::to_string(&pair).unwrap_or_else(|_| "[null,null]".to_string())
        }
    }
}

/// Decode a date range value
///
/// Values starting with `[` are read as a JSON date pair; a malformed pair
/// yields an unbounded range. Anything else is a preset tag, with unknown
/// tags falling back to the default preset.
#[must_use]
pub fn decode_date_range(value: &str) -> DateRangeSpec {
    let value = value.trim();
    if value.starts_with('[') {
        let (start, end) = serde_json::from_str::<(Option<String>, Option<String>)>(value)
            .unwrap_or((None, None));
        let parse = |side: Option<String>| side.and_then(|s| s.parse::<NaiveDate>().ok());
        return DateRangeSpec::Explicit {
            start: parse(start),
            end: parse(end),
        };
    }

    DatePreset::from_tag(value).map_or_else(DateRangeSpec::default, DateRangeSpec::Preset)
}

/// Render parameters as a URL query string (without the leading `?`)
#[must_use]
pub fn to_query_string(params: &FlatParams) -> String {
    serde_urlencoded::to_string(params).unwrap_or_default()
}

/// Parse a URL query string (a leading `?` is ignored)
///
/// A string that cannot be parsed yields an empty map.
#[must_use]
pub fn from_query_string(query: &str) -> FlatParams {
    let query = query.strip_prefix('?').unwrap_or(query);
    serde_urlencoded::from_str(query).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> FlatParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn samples() -> Vec<FilterCriteria> {
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        vec![
            FilterCriteria::default(),
            FilterCriteria::builder().search_term("cat & dog").build(),
            FilterCriteria::builder().search_term("  padded ").build(),
            FilterCriteria::builder().prefix("").build(),
            FilterCriteria::builder().prefix("photos/2024/").build(),
            FilterCriteria::builder().preset(DatePreset::Last24Hours).build(),
            FilterCriteria::builder().between(day(2024, 1, 3), day(2024, 1, 10)).build(),
            FilterCriteria::builder().between(None, day(2024, 2, 29)).build(),
            FilterCriteria::builder().between(None, None).build(),
            FilterCriteria::builder()
                .search_term("x")
                .prefix("a/")
                .preset(DatePreset::LastYear)
                .sort_by(SortBy::Key)
                .sort_order(SortOrder::Asc)
                .build(),
        ]
    }

    #[test]
    fn test_default_encodes_empty() {
        assert!(encode(&FilterCriteria::default()).is_empty());
    }

    #[test]
    fn test_only_changed_fields_are_encoded() {
        let criteria = FilterCriteria::builder().sort_by(SortBy::Key).build();
        assert_eq!(encode(&criteria), params(&[("sortBy", "key")]));
    }

    #[test]
    fn test_roundtrip() {
        for criteria in samples() {
            assert_eq!(decode(&encode(&criteria)), criteria, "{criteria:?}");
        }
    }

    #[test]
    fn test_roundtrip_through_query_string() {
        for criteria in samples() {
            let query = to_query_string(&encode(&criteria));
            assert_eq!(decode(&from_query_string(&query)), criteria, "{query}");
        }
    }

    #[test]
    fn test_explicit_range_encoding() {
        let criteria = FilterCriteria::builder()
            .between(NaiveDate::from_ymd_opt(2024, 1, 3), None)
            .build();
        assert_eq!(
            encode(&criteria).get(fields::DATE_RANGE_TYPE).map(String::as_str),
            Some(r#"["2024-01-03",null]"#)
        );
    }

    #[test]
    fn test_decode_falls_back_per_field() {
        let decoded = decode(&params(&[
            ("searchTerm", "cat"),
            ("sortBy", "size"),
            ("sortOrder", "asc"),
            ("dateRangeType", "fortnight"),
            ("unknown", "ignored"),
        ]));
        assert_eq!(decoded.search_term, "cat");
        assert_eq!(decoded.sort_by, SortBy::Date);
        assert_eq!(decoded.sort_order, SortOrder::Asc);
        assert_eq!(decoded.date_range, DateRangeSpec::default());
    }

    #[test]
    fn test_malformed_date_pair_is_unbounded() {
        let unbounded = DateRangeSpec::Explicit { start: None, end: None };
        assert_eq!(decode_date_range("[2024-01-03"), unbounded);
        assert_eq!(decode_date_range("[1, 2]"), unbounded);
        assert_eq!(
            decode_date_range(r#"["2024-13-40","2024-01-10"]"#),
            DateRangeSpec::Explicit {
                start: None,
                end: NaiveDate::from_ymd_opt(2024, 1, 10),
            }
        );
    }

    #[test]
    fn test_query_string_format() {
        let criteria = FilterCriteria::builder()
            .search_term("red car")
            .sort_order(SortOrder::Asc)
            .build();
        assert_eq!(
            to_query_string(&encode(&criteria)),
            "searchTerm=red+car&sortOrder=asc"
        );
        assert_eq!(
            from_query_string("?searchTerm=red+car").get("searchTerm").map(String::as_str),
            Some("red car")
        );
    }

    #[test]
    fn test_empty_query_string() {
        assert!(from_query_string("").is_empty());
        assert!(from_query_string("?").is_empty());
        assert!(decode(&from_query_string("")).is_default());
    }
}
