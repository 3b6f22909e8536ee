//! Turns a [`SearchIntent`] into upstream text searches and merges the results.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use venuescout_core::{CategoryCatalog, GeoPoint, SearchIntent, Venue};

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::normalize::normalize_records;

/// The full, ordered result set for one intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub venues: Vec<Venue>,
    /// Bias center actually used; may come from geocoding the query.
    pub center: Option<GeoPoint>,
    /// Categories whose search failed while others succeeded.
    pub failed_categories: Vec<String>,
}

/// Routes search intents to the places endpoints.
#[derive(Clone)]
pub struct PlacesGateway {
    client: Arc<PlacesClient>,
    catalog: Arc<CategoryCatalog>,
}

impl PlacesGateway {
    #[must_use]
    pub fn new(client: Arc<PlacesClient>, catalog: Arc<CategoryCatalog>) -> Self {
        Self { client, catalog }
    }

    #[must_use]
    pub fn client(&self) -> &Arc<PlacesClient> {
        &self.client
    }

    #[must_use]
    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    /// Runs the upstream searches an intent calls for.
    ///
    /// - categories selected: one search per category, free text ignored,
    ///   biased toward the center when one is given;
    /// - free text only: bias center is the given center, or the query
    ///   geocoded when there is none, then one search across all categories;
    /// - center only: one search across all categories around it;
    /// - nothing: empty result, no upstream call.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Geocoding`] when the query cannot be located,
    /// [`PlacesError::CategoriesFailed`] when every category search fails,
    /// or the transport error of a single unscoped search.
    pub async fn search(&self, intent: &SearchIntent) -> Result<SearchResults, PlacesError> {
        let categories = intent.categories();
        let bias = intent.bias();

        if !categories.is_empty() {
            return self.search_categories(&categories, bias).await;
        }

        let center = match (intent.query_text(), bias) {
            (None, None) => {
                tracing::debug!("empty search intent, skipping upstream call");
                return Ok(SearchResults::default());
            }
            (_, Some(center)) => center,
            (Some(query), None) => self.client.geocode(&query, None).await?,
        };

        let text_query = self.catalog.unscoped_query();
        let venues = self.text_search(&text_query, Some(center)).await?;
        tracing::info!(
            count = venues.len(),
            center = %center,
            "unscoped search complete"
        );
        Ok(SearchResults {
            venues: dedupe_by_id(venues),
            center: Some(center),
            failed_categories: Vec::new(),
        })
    }

    async fn search_categories(
        &self,
        categories: &[String],
        bias: Option<GeoPoint>,
    ) -> Result<SearchResults, PlacesError> {
        let branches = join_all(categories.iter().map(|category| async move {
            let keyword = self.catalog.keyword_for(category);
            let result = self.text_search(keyword, bias).await;
            (category.clone(), result)
        }))
        .await;

        let total = branches.len();
        let mut tagged = Vec::new();
        let mut failed_categories = Vec::new();
        let mut first_error = None;

        for (category, result) in branches {
            match result {
                Ok(mut venues) => {
                    for venue in &mut venues {
                        venue.add_type(&category);
                    }
                    tagged.extend(venues);
                }
                Err(err) => {
                    tracing::warn!(category = %category, error = %err, "category search failed");
                    failed_categories.push(category);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        if failed_categories.len() == total {
            if let Some(first) = first_error {
                return Err(PlacesError::CategoriesFailed {
                    count: total,
                    first: Box::new(first),
                });
            }
        }

        let venues = dedupe_by_id(tagged);
        tracing::info!(
            categories = total,
            failed = failed_categories.len(),
            count = venues.len(),
            "category search complete"
        );
        Ok(SearchResults {
            venues,
            center: bias,
            failed_categories,
        })
    }

    async fn text_search(
        &self,
        text_query: &str,
        bias: Option<GeoPoint>,
    ) -> Result<Vec<Venue>, PlacesError> {
        let body = self.client.search_text(text_query, bias).await?;
        Ok(normalize_records(result_records(&body), self.client.photos()))
    }
}

/// The record list of a search body: `places` (v1) or `results` (legacy).
fn result_records(body: &Value) -> &[Value] {
    body.get("places")
        .or_else(|| body.get("results"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Keeps the first occurrence of each id, unioning later duplicates' types into it.
#[must_use]
pub fn dedupe_by_id(venues: Vec<Venue>) -> Vec<Venue> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(venues.len());
    let mut out: Vec<Venue> = Vec::with_capacity(venues.len());

    for venue in venues {
        if let Some(&pos) = index.get(&venue.id) {
            out[pos].merge_types(&venue.types);
        } else {
            index.insert(venue.id.clone(), out.len());
            out.push(venue);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use venuescout_core::{primary_type_for, OpenState};

    use super::*;

    fn venue(id: &str, types: &[&str]) -> Venue {
        let types: Vec<String> = types.iter().map(|s| (*s).to_string()).collect();
        Venue {
            id: id.to_string(),
            name: id.to_string(),
            address: "somewhere".to_string(),
            location: GeoPoint { lat: 0.0, lng: 0.0 },
            rating: None,
            primary_type: primary_type_for(&types),
            types,
            photo_url: None,
            open_state: OpenState::Unknown,
            price_level: None,
        }
    }

    #[test]
    fn dedupe_keeps_first_and_unions_types() {
        let merged = dedupe_by_id(vec![
            venue("a", &["point_of_interest", "stadium"]),
            venue("b", &["gym"]),
            venue("a", &["point_of_interest", "gym"]),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "a");
        assert_eq!(merged[0].types, ["point_of_interest", "stadium", "gym"]);
        assert_eq!(merged[0].primary_type, "gym");
        assert_eq!(merged[1].id, "b");
    }

    #[test]
    fn result_records_reads_either_key() {
        let v1 = json!({ "places": [{ "id": "x" }] });
        let legacy = json!({ "status": "OK", "results": [{}, {}] });
        assert_eq!(result_records(&v1).len(), 1);
        assert_eq!(result_records(&legacy).len(), 2);
        assert!(result_records(&json!({})).is_empty());
    }
}
