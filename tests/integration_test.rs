//! Integration tests for bucketview
//!
//! These tests drive the public API end to end: uploads through a gallery,
//! filtering and layout of the result, and state persisted in a temporary
//! sled store across reopen.

use bucketview::{
    filters::{CriteriaStore, DatePreset, FilterCriteria, FilterEngine, SearchOptions, codec},
    gallery::{Gallery, MemoryObjectStore, ObjectStore},
    keys::{DEFAULT_TEMPLATE, UlidGenerator},
    layout::{DimensionCache, Dimensions, LayoutItem, LayoutOptions, layout, rows},
    settings::{CURRENT_SENTINEL, SETTINGS_KEY, SettingsStore, StoredSettings},
    store::{KeyValueStore, SledStore},
};
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

/// Helper function to open a sled store in a fresh temporary directory
fn setup_store() -> (SledStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = SledStore::open(dir.path().join("state")).unwrap();
    (store, dir)
}

fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp).unwrap().with_timezone(&Utc)
}

#[test]
fn test_upload_filter_layout_flow() {
    let objects = MemoryObjectStore::new();
    objects.insert("archive/old.jpg", vec![0; 8], at("2020-01-01T00:00:00Z")).unwrap();

    let mut gallery = Gallery::with_ids(&objects, "https://cdn.example.com", UlidGenerator::seeded(42));
    gallery.refresh().unwrap();

    let now = Utc::now();
    for name in ["beach.jpg", "forest.png", "city.jpg"] {
        let context = gallery.prepare(name, now);
        gallery.upload(&context, b"pixels").unwrap();
    }
    assert_eq!(gallery.photos().len(), 4);
    assert_eq!(objects.list().unwrap().len(), 4);

    let uploaded: Vec<_> = gallery
        .photos()
        .iter()
        .filter(|photo| photo.key.starts_with("i/"))
        .collect();
    assert_eq!(uploaded.len(), 3);
    for photo in &uploaded {
        assert!(photo.url.ends_with(&photo.key));
    }

    // Only the fresh uploads are inside the last day
    let recent = FilterCriteria::builder().preset(DatePreset::Last24Hours).build();
    let view = gallery.view(&recent, now + Duration::minutes(1));
    assert_eq!(view.len(), 3);

    let sizes = DimensionCache::new(16);
    sizes.insert(view[0].key.clone(), Dimensions::new(1600, 800));
    let items: Vec<LayoutItem> = view.iter().map(|photo| sizes.item_for(&photo.key)).collect();
    let boxes = layout(&items, 600.0, &LayoutOptions::new(8.0, 200.0));
    assert_eq!(boxes.len(), 3);
    for row in rows(&boxes) {
        let width: f64 = row.iter().map(|b| b.width).sum::<f64>() + 8.0 * (row.len() - 1) as f64;
        assert!((width - 600.0).abs() < 1e-6);
    }
}

#[test]
fn test_delete_removes_from_view() {
    let objects = MemoryObjectStore::new();
    objects.insert("a.jpg", vec![1], at("2024-01-01T00:00:00Z")).unwrap();
    objects.insert("b.jpg", vec![1], at("2024-01-02T00:00:00Z")).unwrap();

    let mut gallery = Gallery::new(&objects, "");
    gallery.refresh().unwrap();
    gallery.delete("a.jpg").unwrap();

    let view = gallery.view(&FilterCriteria::default(), at("2024-02-01T00:00:00Z"));
    let keys: Vec<&str> = view.iter().map(|photo| photo.key.as_str()).collect();
    assert_eq!(keys, vec!["b.jpg"]);
    assert!(objects.head("a.jpg").unwrap().is_none());
}

#[test]
fn test_fuzzy_view_keeps_close_matches() {
    let objects = MemoryObjectStore::new();
    for key in ["2024/moon.jpg", "2024/sunset-beach.jpg", "2024/sunset.jpg"] {
        objects.insert(key, vec![1], at("2024-01-01T00:00:00Z")).unwrap();
    }

    let mut gallery = Gallery::new(&objects, "").engine(FilterEngine::new(SearchOptions::fuzzy(0.6)));
    gallery.refresh().unwrap();

    let criteria = codec::decode(&codec::from_query_string("searchTerm=sunset"));
    let view = gallery.view(&criteria, at("2024-02-01T00:00:00Z"));
    assert!(!view.is_empty());
    assert!(view.iter().all(|photo| photo.key.contains("sunset")));
}

#[test]
fn test_criteria_survive_reopen() {
    let (store, _dir) = setup_store();
    let criteria = FilterCriteria::builder()
        .search_term("cat")
        .preset(DatePreset::Last30Days)
        .build();

    {
        let mut remembered = CriteriaStore::open(&store).unwrap();
        remembered.save(&criteria).unwrap();
    }

    store.flush().unwrap();
    let remembered = CriteriaStore::open(&store).unwrap();
    assert_eq!(remembered.current(), criteria);
    assert_eq!(
        codec::from_query_string(&remembered.query_string()),
        codec::encode(&criteria)
    );
}

#[test]
fn test_settings_migrate_from_v2_through_sled() {
    let (store, _dir) = setup_store();
    let v2 = serde_json::json!({
        "version": 2,
        "data": {
            "options": {"bucket": "live", "forcePathStyle": "true"},
            "profiles": [["office", {"bucket": "office"}], ["home", CURRENT_SENTINEL]],
        },
    });
    store.set_item(SETTINGS_KEY, &v2.to_string()).unwrap();

    let mut settings = SettingsStore::open(&store).unwrap();
    assert_eq!(settings.stored_state().unwrap(), StoredSettings::Outdated(2));
    let (name, options) = settings.active().unwrap();
    assert_eq!(name, "home");
    assert_eq!(options.bucket, "live");
    assert!(options.force_path_style);
    assert_eq!(options.key_template, DEFAULT_TEMPLATE);

    settings.persist().unwrap();
    let reopened = SettingsStore::open(&store).unwrap();
    assert_eq!(reopened.stored_state().unwrap(), StoredSettings::Current);
    assert_eq!(reopened.profiles(), settings.profiles());
}

#[test]
fn test_dimension_cache_survives_reopen() {
    let (store, _dir) = setup_store();
    let cache = DimensionCache::new(8);
    cache.insert("a.jpg", Dimensions::new(300, 200));
    cache.save_to(&store).unwrap();

    let restored = DimensionCache::restore_from(&store, 8).unwrap();
    assert_eq!(restored.get("a.jpg"), Some(Dimensions::new(300, 200)));
}
