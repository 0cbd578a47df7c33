//! Filter command - narrow a bucket listing the way the gallery does

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use chrono::Utc;
use colored::Colorize;
use tracing::debug;

use crate::{
    BucketviewError, PhotoRecord,
    cli::CriteriaArgs,
    config::BucketviewConfig,
    filters::{CriteriaStore, FilterCriteria, FilterEngine, SearchMode, SearchOptions, codec},
    layout::{self, DimensionCache},
    output,
    store::KeyValueStore,
};

type Result<T> = std::result::Result<T, BucketviewError>;

/// Flags of the filter command besides the criteria
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterFlags {
    pub fuzzy: bool,
    pub threshold: Option<f64>,
    pub save: bool,
    pub reset: bool,
    pub print_query: bool,
    pub width: Option<f64>,
}

/// Read a JSON array of photo records from `path`, or stdin for `-`
///
/// # Errors
///
/// Returns `BucketviewError` if the file cannot be read or is not a listing.
pub fn read_listing(path: &Path) -> Result<Vec<PhotoRecord>> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

/// Search options from config with command-line overrides applied
#[must_use]
pub fn search_options(config: &BucketviewConfig, flags: FilterFlags) -> SearchOptions {
    let mut options = config.search_options();
    if flags.fuzzy {
        options.mode = SearchMode::Fuzzy;
    }
    if let Some(threshold) = flags.threshold {
        options.threshold = threshold;
    }
    options.normalized()
}

/// Work out the criteria to apply, updating the remembered ones as asked
///
/// # Errors
///
/// Returns `BucketviewError` if the store cannot be read or written.
pub fn resolve_criteria<S: KeyValueStore>(
    remembered: &mut CriteriaStore<S>,
    args: &CriteriaArgs,
    flags: FilterFlags,
) -> Result<FilterCriteria> {
    if flags.reset {
        remembered.reset()?;
    }

    match args.criteria() {
        Some(criteria) => {
            if flags.save {
                remembered.save(&criteria)?;
                debug!(query = %remembered.query_string(), "saved filter criteria");
            }
            Ok(criteria)
        }
        None => Ok(remembered.current()),
    }
}

/// Execute the filter command
///
/// # Errors
///
/// Returns `BucketviewError` if the listing cannot be read or the store fails.
pub fn execute<S: KeyValueStore>(
    store: S,
    listing: &Path,
    args: &CriteriaArgs,
    flags: FilterFlags,
    config: &BucketviewConfig,
    quiet: bool,
) -> Result<()> {
    let photos = read_listing(listing)?;
    let mut remembered = CriteriaStore::open(&store)?;
    let criteria = resolve_criteria(&mut remembered, args, flags)?;

    let engine = FilterEngine::new(search_options(config, flags));
    let matches = engine.apply(&photos, &criteria, Utc::now());
    debug!(total = photos.len(), matched = matches.len(), "filtered listing");

    if !quiet {
        println!(
            "{}",
            format!("{} of {} photo(s) match:", matches.len(), photos.len()).bold()
        );
    }
    for photo in &matches {
        println!("{}", output::photo_line(photo, quiet));
    }

    if flags.print_query {
        let query = codec::to_query_string(&codec::encode(&criteria));
        if quiet {
            println!("{query}");
        } else {
            println!("Query: {}", query.cyan());
        }
    }

    if let Some(width) = flags.width {
        let cache = DimensionCache::restore_from(&store, config.dimension_cache_capacity)?;
        let items: Vec<_> = matches.iter().map(|photo| cache.item_for(&photo.key)).collect();
        let boxes = layout::layout(&items, width, &config.layout);
        if !quiet {
            println!("{}", "Layout:".bold());
        }
        for (index, item) in boxes.iter().enumerate() {
            println!("{}", output::layout_line(index, item, quiet));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DatePreset, DateRangeSpec};
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    fn prefix_args(prefix: &str) -> CriteriaArgs {
        CriteriaArgs {
            prefix: Some(prefix.to_string()),
            ..CriteriaArgs::default()
        }
    }

    #[test]
    fn test_read_listing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listing.json");
        fs::write(
            &path,
            r#"[{"key":"a.jpg","lastModified":"2024-01-01T00:00:00Z","url":"https://cdn/a.jpg"}]"#,
        )
        .unwrap();
        let photos = read_listing(&path).unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].key, "a.jpg");

        fs::write(&path, "{}").unwrap();
        assert!(matches!(read_listing(&path), Err(BucketviewError::JsonError(_))));
    }

    #[test]
    fn test_saved_criteria_are_reused() {
        let store = MemoryStore::new();
        let mut remembered = CriteriaStore::open(&store).unwrap();
        let save = FilterFlags {
            save: true,
            ..FilterFlags::default()
        };

        let given = resolve_criteria(&mut remembered, &prefix_args("2024/"), save).unwrap();
        assert_eq!(given.prefix.as_deref(), Some("2024/"));

        let mut reopened = CriteriaStore::open(&store).unwrap();
        let reused = resolve_criteria(&mut reopened, &CriteriaArgs::default(), FilterFlags::default()).unwrap();
        assert_eq!(reused, given);
    }

    #[test]
    fn test_unsaved_criteria_are_not_remembered() {
        let store = MemoryStore::new();
        let mut remembered = CriteriaStore::open(&store).unwrap();
        resolve_criteria(&mut remembered, &prefix_args("x/"), FilterFlags::default()).unwrap();
        assert!(remembered.current().is_default());
    }

    #[test]
    fn test_reset_forgets_criteria() {
        let store = MemoryStore::new();
        let mut remembered = CriteriaStore::open(&store).unwrap();
        remembered
            .save(&FilterCriteria::builder().preset(DatePreset::Last90Days).build())
            .unwrap();

        let reset = FilterFlags {
            reset: true,
            ..FilterFlags::default()
        };
        let criteria = resolve_criteria(&mut remembered, &CriteriaArgs::default(), reset).unwrap();
        assert_eq!(criteria.date_range, DateRangeSpec::Preset(DatePreset::All));
    }

    #[test]
    fn test_search_options_overrides() {
        let config = BucketviewConfig::default();
        let flags = FilterFlags {
            fuzzy: true,
            threshold: Some(1.5),
            ..FilterFlags::default()
        };
        let options = search_options(&config, flags);
        assert_eq!(options.mode, SearchMode::Fuzzy);
        assert!((options.threshold - 1.0).abs() < f64::EPSILON);
        assert_eq!(search_options(&config, FilterFlags::default()).mode, SearchMode::Exact);
    }
}
