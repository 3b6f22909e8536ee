use std::path::Path;

use venuescout_core::{load_catalog, CategoryCatalog};

/// Load the catalog override at `path`, or the built-in catalog.
///
/// # Errors
///
/// Returns an error if the override cannot be read or fails validation.
pub(crate) fn load_catalog_or_default(path: Option<&Path>) -> anyhow::Result<CategoryCatalog> {
    match path {
        Some(p) => {
            let catalog = load_catalog(p)?;
            tracing::debug!(
                path = %p.display(),
                categories = catalog.categories.len(),
                "loaded category catalog"
            );
            Ok(catalog)
        }
        None => Ok(CategoryCatalog::default()),
    }
}

pub(crate) fn run_categories(catalog: &CategoryCatalog, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog.categories)?);
        return Ok(());
    }

    println!("{:<16}{:<18}{:<10}KEYWORDS", "ID", "LABEL", "COLOR");
    for c in &catalog.categories {
        println!(
            "{:<16}{:<18}{:<10}{}",
            c.id,
            c.label,
            c.color,
            c.search_keywords.join(", ")
        );
    }
    Ok(())
}
