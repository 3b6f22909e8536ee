//! `search` command: runs a venue search and prints it page by page.

use std::sync::Arc;
use std::time::Duration;

use venuescout_core::{AppConfig, CategoryCatalog, GeoPoint, SearchIntent, Venue};
use venuescout_places::{Page, PagedResultCache, PlacesClient, PlacesGateway, VenueFeed};

pub(crate) struct SearchOptions {
    pub page_size: usize,
    pub all: bool,
    pub strict: bool,
    pub json: bool,
}

/// Builds an intent from CLI arguments. Out-of-range coordinates mean no bias.
pub(crate) fn build_intent(
    query: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    types: Vec<String>,
) -> SearchIntent {
    SearchIntent {
        query,
        center: lat
            .zip(lng)
            .and_then(|(lat, lng)| GeoPoint::new_checked(lat, lng)),
        types,
    }
}

/// Run a search and print the first page, or every page with `--all`.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the search fails.
pub(crate) async fn run_search(
    config: &AppConfig,
    catalog: CategoryCatalog,
    intent: SearchIntent,
    options: SearchOptions,
) -> anyhow::Result<()> {
    if intent.is_empty() {
        println!("nothing to search for; pass --query, --lat/--lng or --type");
        return Ok(());
    }

    let selected = intent.categories();
    let catalog = Arc::new(catalog);
    let client = Arc::new(PlacesClient::from_config(config)?);
    let gateway = PlacesGateway::new(client, Arc::clone(&catalog));
    let cache = Arc::new(PagedResultCache::new(gateway));
    let mut feed = VenueFeed::new(
        cache,
        intent,
        options.page_size,
        Duration::from_secs(config.freshness_secs),
    );
    tracing::info!(fingerprint = %feed.fingerprint(), "search started");

    let mut shown = 0usize;
    while let Some(mut page) = feed.next_page().await? {
        if options.strict {
            page.items = catalog.filter_by_categories(&page.items, &selected);
        }
        if options.json {
            println!("{}", serde_json::to_string_pretty(&page)?);
        } else {
            print_page(&catalog, &page, shown == 0);
        }
        shown += page.items.len();
        if !options.all {
            if page.has_more && !options.json {
                println!("... more results available; rerun with --all");
            }
            break;
        }
    }

    if shown == 0 && !options.json {
        println!("no venues found");
    }
    Ok(())
}

fn print_page(catalog: &CategoryCatalog, page: &Page, first: bool) {
    if first {
        if let Some(center) = page.center {
            println!("around {center}");
        }
        if !page.failed_categories.is_empty() {
            println!(
                "warning: searches failed for: {}",
                page.failed_categories.join(", ")
            );
        }
        println!(
            "{:<32}{:<16}{:<8}{:<8}{:<10}ADDRESS",
            "NAME", "CATEGORY", "RATING", "OPEN", "DIST"
        );
    }
    for venue in &page.items {
        println!("{}", format_row(catalog, venue, page.center));
    }
}

fn format_row(catalog: &CategoryCatalog, venue: &Venue, center: Option<GeoPoint>) -> String {
    let category = catalog.classify_or_fallback(&venue.types);
    let rating = venue
        .rating
        .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
    let open = match venue.open_state {
        venuescout_core::OpenState::Open => "yes",
        venuescout_core::OpenState::Closed => "no",
        venuescout_core::OpenState::Unknown => "?",
    };
    let distance = center.map_or_else(
        || "-".to_string(),
        |c| format!("{:.1} km", c.distance_km(&venue.location)),
    );
    format!(
        "{:<32}{:<16}{:<8}{:<8}{:<10}{}",
        truncate(&venue.name, 30),
        category.label,
        rating,
        open,
        distance,
        venue.address
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    } else {
        s.to_string()
    }
}
