use std::path::Path;

use super::*;
use crate::geo::GeoPoint;
use crate::venue::{primary_type_for, OpenState};

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

fn venue(id: &str, types: &[&str]) -> Venue {
    Venue {
        id: id.to_string(),
        name: id.to_string(),
        address: "1 Main St".to_string(),
        location: GeoPoint { lat: 0.0, lng: 0.0 },
        rating: None,
        types: tags(types),
        photo_url: None,
        open_state: OpenState::Unknown,
        price_level: None,
        primary_type: primary_type_for(&tags(types)),
    }
}

fn category(id: &str, keywords: &[&str]) -> CategoryConfig {
    CategoryConfig {
        id: id.to_string(),
        label: id.to_string(),
        icon: "place".to_string(),
        color: "#000000".to_string(),
        gradient_colors: vec![],
        search_keywords: tags(keywords),
    }
}

#[test]
fn default_catalog_has_four_categories_in_order() {
    let catalog = CategoryCatalog::default();
    let ids: Vec<&str> = catalog.categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["gym", "stadium", "golf_course", "swimming_pool"]);
}

#[test]
fn get_is_case_insensitive() {
    let catalog = CategoryCatalog::default();
    assert_eq!(catalog.get("GOLF_COURSE").map(|c| c.label.as_str()), Some("Golf Courses"));
    assert!(catalog.get("tennis").is_none());
}

#[test]
fn keyword_for_known_and_unknown_ids() {
    let catalog = CategoryCatalog::default();
    assert_eq!(catalog.keyword_for("golf_course"), "golf");
    assert_eq!(catalog.keyword_for("swimming_pool"), "swimming pool");
    assert_eq!(catalog.keyword_for("bowling_alley"), "bowling_alley");
}

#[test]
fn unscoped_query_joins_first_keywords() {
    let catalog = CategoryCatalog::default();
    assert_eq!(catalog.unscoped_query(), "gym OR stadium OR golf OR swimming pool");
}

#[test]
fn unscoped_query_for_empty_catalog() {
    let catalog = CategoryCatalog { categories: vec![] };
    assert_eq!(catalog.unscoped_query(), "sports");
}

#[test]
fn classify_prefers_exact_type_match() {
    let catalog = CategoryCatalog::default();
    let hit = catalog.classify(&tags(&["point_of_interest", "stadium"]));
    assert_eq!(hit.map(|c| c.id.as_str()), Some("stadium"));
}

#[test]
fn classify_falls_back_to_keyword_substring() {
    let catalog = CategoryCatalog::default();
    let hit = catalog.classify(&tags(&["fitness_center"]));
    assert_eq!(hit.map(|c| c.id.as_str()), Some("gym"));
}

#[test]
fn classify_or_fallback_returns_default_presentation() {
    let catalog = CategoryCatalog::default();
    let fallback = catalog.classify_or_fallback(&tags(&["library"]));
    assert_eq!(fallback.id, "default");
    assert_eq!(fallback.label, "Sports Venue");
}

#[test]
fn filter_by_categories_keeps_matching_venues() {
    let catalog = CategoryCatalog::default();
    let venues = vec![
        venue("a", &["gym"]),
        venue("b", &["stadium"]),
        venue("c", &["library"]),
    ];
    let kept = catalog.filter_by_categories(&venues, &tags(&["stadium"]));
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, "b");

    let all = catalog.filter_by_categories(&venues, &[]);
    assert_eq!(all.len(), 3);
}

#[test]
fn validate_rejects_empty_id() {
    let catalog = CategoryCatalog {
        categories: vec![category("  ", &["gym"])],
    };
    assert!(matches!(
        validate_catalog(&catalog),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn validate_rejects_duplicate_ids_ignoring_case() {
    let catalog = CategoryCatalog {
        categories: vec![category("gym", &["gym"]), category("GYM", &["fitness"])],
    };
    let err = validate_catalog(&catalog).unwrap_err();
    assert!(err.to_string().contains("duplicate category id"));
}

#[test]
fn validate_rejects_category_without_keywords() {
    let catalog = CategoryCatalog {
        categories: vec![category("climbing", &[""])],
    };
    let err = validate_catalog(&catalog).unwrap_err();
    assert!(err.to_string().contains("climbing"));
}

#[test]
fn validate_accepts_default_catalog() {
    assert!(validate_catalog(&CategoryCatalog::default()).is_ok());
}

#[test]
fn load_catalog_missing_file_is_io_error() {
    let result = load_catalog(Path::new("/nonexistent/categories.yaml"));
    assert!(matches!(result, Err(ConfigError::CatalogFileIo { .. })));
}

#[test]
fn load_catalog_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("categories.yaml");
    assert!(path.exists(), "categories.yaml missing at {path:?}");
    let catalog = load_catalog(&path).unwrap();
    assert_eq!(catalog, CategoryCatalog::default());
}
