use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::venue::Venue;
use crate::ConfigError;

/// Query used for an unscoped search when the catalog has no categories.
const FALLBACK_UNSCOPED_QUERY: &str = "sports";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Stable identifier, also the upstream type tag it corresponds to.
    pub id: String,
    pub label: String,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub gradient_colors: Vec<String>,
    /// Ordered; the first keyword drives the upstream text query.
    pub search_keywords: Vec<String>,
}

impl CategoryConfig {
    fn builtin(
        id: &str,
        label: &str,
        icon: &str,
        color: &str,
        gradient: [&str; 2],
        keywords: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            gradient_colors: gradient.iter().map(|s| (*s).to_string()).collect(),
            search_keywords: keywords.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Presentation for venues that match no catalog category.
    #[must_use]
    pub fn fallback() -> Self {
        Self::builtin(
            "default",
            "Sports Venue",
            "place",
            "#A0AEC0",
            ["#A0AEC0", "#B794F6"],
            &[],
        )
    }

    #[must_use]
    pub fn first_keyword(&self) -> Option<&str> {
        self.search_keywords.first().map(String::as_str)
    }
}

/// The fixed, ordered set of venue categories users can filter by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    pub categories: Vec<CategoryConfig>,
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryConfig::builtin(
                    "gym",
                    "Gyms",
                    "fitness-center",
                    "#6A4C93",
                    ["#6A4C93", "#8B5CF6"],
                    &["gym", "fitness", "workout"],
                ),
                CategoryConfig::builtin(
                    "stadium",
                    "Stadiums",
                    "sports-football",
                    "#A663CC",
                    ["#A663CC", "#B794F6"],
                    &["stadium", "sports complex"],
                ),
                CategoryConfig::builtin(
                    "golf_course",
                    "Golf Courses",
                    "golf-course",
                    "#8B5CF6",
                    ["#8B5CF6", "#A663CC"],
                    &["golf", "golf course"],
                ),
                CategoryConfig::builtin(
                    "swimming_pool",
                    "Swimming Pools",
                    "pool",
                    "#B794F6",
                    ["#B794F6", "#A663CC"],
                    &["swimming pool", "pool"],
                ),
            ],
        }
    }
}

impl CategoryCatalog {
    /// Case-insensitive lookup by category id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CategoryConfig> {
        self.categories
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(id))
    }

    /// The text-search keyword for a category id.
    ///
    /// Ids absent from the catalog are searched for verbatim.
    #[must_use]
    pub fn keyword_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id)
            .and_then(CategoryConfig::first_keyword)
            .unwrap_or(id)
    }

    /// First keywords of every category joined with `" OR "`.
    #[must_use]
    pub fn unscoped_query(&self) -> String {
        let keywords: Vec<&str> = self
            .categories
            .iter()
            .filter_map(CategoryConfig::first_keyword)
            .collect();
        if keywords.is_empty() {
            FALLBACK_UNSCOPED_QUERY.to_string()
        } else {
            keywords.join(" OR ")
        }
    }

    /// Maps upstream type tags to a catalog category.
    ///
    /// An exact id match wins; otherwise the first category with a keyword
    /// contained in the joined tags. `None` means the fallback category.
    #[must_use]
    pub fn classify(&self, types: &[String]) -> Option<&CategoryConfig> {
        if let Some(hit) = self
            .categories
            .iter()
            .find(|c| types.iter().any(|t| *t == c.id))
        {
            return Some(hit);
        }

        let haystack = types.join(" ").to_lowercase();
        self.categories.iter().find(|c| {
            c.search_keywords
                .iter()
                .any(|k| haystack.contains(&k.to_lowercase()))
        })
    }

    /// Like [`CategoryCatalog::classify`] but never empty-handed.
    #[must_use]
    pub fn classify_or_fallback(&self, types: &[String]) -> CategoryConfig {
        self.classify(types)
            .cloned()
            .unwrap_or_else(CategoryConfig::fallback)
    }

    /// Keeps venues whose classified category is among `selected`.
    ///
    /// An empty selection keeps everything.
    #[must_use]
    pub fn filter_by_categories(&self, venues: &[Venue], selected: &[String]) -> Vec<Venue> {
        if selected.is_empty() {
            return venues.to_vec();
        }
        venues
            .iter()
            .filter(|v| {
                let id = self
                    .classify(&v.types)
                    .map_or("default", |c| c.id.as_str());
                selected.iter().any(|s| s.eq_ignore_ascii_case(id))
            })
            .cloned()
            .collect()
    }
}

/// Load and validate a category catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CategoryCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CategoryCatalog =
        serde_yaml::from_str(&content).map_err(ConfigError::CatalogFileParse)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CategoryCatalog) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for category in &catalog.categories {
        if category.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category id must be non-empty".to_string(),
            ));
        }

        if !seen_ids.insert(category.id.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category id: '{}'",
                category.id
            )));
        }

        if category
            .search_keywords
            .iter()
            .all(|k| k.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "category '{}' needs at least one search keyword",
                category.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
