//! HTTP client for the places endpoints.
//!
//! Wraps `reqwest` with API key handling, base URL management and the shared
//! [`RequestScheduler`]. Every request goes through the scheduler and the
//! retry policy; nothing here talks to the network directly otherwise.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use venuescout_core::{AppConfig, GeoPoint};

use crate::error::PlacesError;
use crate::normalize::PhotoUrls;
use crate::retry::{fetch_json_with_retry, RetryPolicy};
use crate::scheduler::{RequestScheduler, SchedulerConfig};
use crate::types::{Circle, LatLng, LocationBias, SearchTextRequest, SEARCH_TEXT_FIELD_MASK};

const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com";
const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";
const DEFAULT_USER_AGENT: &str = "venuescout/0.1 (venue-discovery)";

/// Smallest bias radius sent to the text search endpoint.
const MIN_TEXT_SEARCH_RADIUS_M: u32 = 1_000;
/// Smallest bias radius used for legacy lookups.
const MIN_LEGACY_BIAS_RADIUS_M: u32 = 5_000;

/// Client for the places endpoints.
///
/// Use [`PlacesClient::from_config`] in production or
/// [`PlacesClient::with_base_urls`] to point at a mock server in tests.
pub struct PlacesClient {
    http: Client,
    api_key: String,
    places_base: Url,
    maps_base: Url,
    language_code: String,
    search_radius_m: u32,
    scheduler: Arc<RequestScheduler>,
    retry: RetryPolicy,
    photos: PhotoUrls,
}

impl PlacesClient {
    /// Builds a client from the loaded application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PlacesError::InvalidBaseUrl`] for a bad base URL.
    pub fn from_config(config: &AppConfig) -> Result<Self, PlacesError> {
        let client = Self::build(
            &config.places_api_key,
            &config.places_base_url,
            &config.maps_base_url,
            &config.user_agent,
        )?;
        Ok(client
            .with_scheduler(SchedulerConfig::from(config))
            .with_retry_policy(RetryPolicy::from(config))
            .with_language(&config.language_code)
            .with_search_radius(config.search_radius_m))
    }

    /// Creates a client against the production endpoints with default tuning.
    ///
    /// # Errors
    ///
    /// See [`PlacesClient::from_config`].
    pub fn new(api_key: &str) -> Result<Self, PlacesError> {
        Self::with_base_urls(api_key, DEFAULT_PLACES_BASE_URL, DEFAULT_MAPS_BASE_URL)
    }

    /// Creates a client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// See [`PlacesClient::from_config`].
    pub fn with_base_urls(
        api_key: &str,
        places_base_url: &str,
        maps_base_url: &str,
    ) -> Result<Self, PlacesError> {
        Self::build(api_key, places_base_url, maps_base_url, DEFAULT_USER_AGENT)
    }

    fn build(
        api_key: &str,
        places_base_url: &str,
        maps_base_url: &str,
        user_agent: &str,
    ) -> Result<Self, PlacesError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let places_base = parse_base_url(places_base_url)?;
        let maps_base = parse_base_url(maps_base_url)?;
        let photos = PhotoUrls::new(places_base.clone(), maps_base.clone(), api_key);

        Ok(Self {
            http,
            api_key: api_key.to_owned(),
            places_base,
            maps_base,
            language_code: "en".to_string(),
            search_radius_m: 5_000,
            scheduler: Arc::new(RequestScheduler::default()),
            retry: RetryPolicy::default(),
            photos,
        })
    }

    #[must_use]
    pub fn with_scheduler(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = Arc::new(RequestScheduler::new(config));
        self
    }

    /// Shares an existing scheduler, e.g. with a second client.
    #[must_use]
    pub fn with_shared_scheduler(mut self, scheduler: Arc<RequestScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language_code: &str) -> Self {
        self.language_code = language_code.to_owned();
        self
    }

    #[must_use]
    pub fn with_search_radius(mut self, radius_m: u32) -> Self {
        self.search_radius_m = radius_m;
        self
    }

    #[must_use]
    pub fn scheduler(&self) -> &Arc<RequestScheduler> {
        &self.scheduler
    }

    #[must_use]
    pub fn photos(&self) -> &PhotoUrls {
        &self.photos
    }

    #[must_use]
    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    /// `locationbias` value for the legacy endpoints.
    pub(crate) fn legacy_bias(&self, bias: Option<GeoPoint>) -> String {
        match bias.and_then(GeoPoint::validated) {
            Some(p) => format!(
                "circle:{}@{},{}",
                self.search_radius_m.max(MIN_LEGACY_BIAS_RADIUS_M),
                p.lat,
                p.lng
            ),
            None => "ipbias".to_string(),
        }
    }

    /// Calls a legacy JSON endpoint under `{maps_base}/maps/api/`, with retry.
    ///
    /// # Errors
    ///
    /// Returns the last transient error once retries are spent, or any
    /// non-transient error immediately. In-body failure statuses are data.
    pub(crate) async fn fetch_legacy(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, PlacesError> {
        let url = self.legacy_url(path, params)?;
        fetch_json_with_retry(&self.retry, || self.get_json(url.clone())).await
    }

    /// Runs one v1 text search, with retry.
    ///
    /// # Errors
    ///
    /// See [`PlacesClient::fetch_legacy`].
    pub(crate) async fn search_text(
        &self,
        text_query: &str,
        bias: Option<GeoPoint>,
    ) -> Result<Value, PlacesError> {
        let url = self
            .places_base
            .join("v1/places:searchText")
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: self.places_base.to_string(),
                reason: e.to_string(),
            })?;

        let request = SearchTextRequest {
            text_query: text_query.to_owned(),
            language_code: self.language_code.clone(),
            location_bias: bias.and_then(GeoPoint::validated).map(|p| LocationBias {
                circle: Circle {
                    center: LatLng {
                        latitude: p.lat,
                        longitude: p.lng,
                    },
                    radius: f64::from(self.search_radius_m.max(MIN_TEXT_SEARCH_RADIUS_M)),
                },
            }),
        };

        tracing::debug!(text_query, biased = request.location_bias.is_some(), "text search");
        fetch_json_with_retry(&self.retry, || self.post_json(url.clone(), &request)).await
    }

    fn legacy_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .maps_base
            .join(&format!("maps/api/{path}"))
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: self.maps_base.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("language", &self.language_code);
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, PlacesError> {
        let http = &self.http;
        self.scheduler
            .submit_with_timeout(async move {
                let response = http.get(url.clone()).send().await?;
                read_json(response, &url).await
            })
            .await
    }

    async fn post_json(&self, url: Url, body: &SearchTextRequest) -> Result<Value, PlacesError> {
        let http = &self.http;
        let api_key = self.api_key.as_str();
        self.scheduler
            .submit_with_timeout(async move {
                let response = http
                    .post(url.clone())
                    .header("X-Goog-Api-Key", api_key)
                    .header("X-Goog-FieldMask", SEARCH_TEXT_FIELD_MASK)
                    .json(body)
                    .send()
                    .await?;
                read_json(response, &url).await
            })
            .await
    }
}

/// Asserts a 2xx HTTP status and parses the body as JSON.
async fn read_json(response: reqwest::Response, url: &Url) -> Result<Value, PlacesError> {
    let status = response.status();
    if !status.is_success() {
        return Err(PlacesError::HttpStatus {
            status: status.as_u16(),
            url: redacted(url),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
        context: redacted(url),
        source: e,
    })
}

/// The URL without its query string, which carries the API key.
fn redacted(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

/// Normalise: ensure the base URL ends with exactly one slash so that
/// relative joins append to it rather than replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url, PlacesError> {
    let normalised = format!("{}/", raw.trim().trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}
