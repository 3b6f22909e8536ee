//! Address suggestions while the user types.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use venuescout_core::GeoPoint;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::status::UpstreamStatus;
use crate::types::{Prediction, RawPrediction};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);
/// Inputs shorter than this get no suggestions and no upstream call.
pub const MIN_INPUT_CHARS: usize = 2;

impl PlacesClient {
    /// Suggests addresses matching `input`, biased toward `bias` when given.
    ///
    /// Any status other than `OK` yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a transport error once retries are spent.
    pub async fn autocomplete(
        &self,
        input: &str,
        bias: Option<GeoPoint>,
    ) -> Result<Vec<Prediction>, PlacesError> {
        let location_bias = self.legacy_bias(bias);
        let body = self
            .fetch_legacy(
                "place/autocomplete/json",
                &[
                    ("input", input),
                    ("types", "geocode"),
                    ("locationbias", &location_bias),
                ],
            )
            .await?;

        let status = UpstreamStatus::of(&body);
        if status != UpstreamStatus::Ok || body.get("status").is_none() {
            tracing::debug!(status = %status, "autocomplete returned no predictions");
            return Ok(Vec::new());
        }

        let predictions = body
            .get("predictions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|p| serde_json::from_value::<RawPrediction>(p.clone()).ok())
                    .map(Prediction::from)
                    .collect()
            })
            .unwrap_or_default();
        Ok(predictions)
    }
}

/// Debounced suggestions for one input field.
///
/// Each [`AutocompleteSession::suggest`] call supersedes the previous ones:
/// a call that is overtaken by a newer one while waiting out the debounce or
/// while its request is in flight resolves to `None`.
pub struct AutocompleteSession {
    client: Arc<PlacesClient>,
    debounce: Duration,
    generation: AtomicU64,
}

impl AutocompleteSession {
    #[must_use]
    pub fn new(client: Arc<PlacesClient>) -> Self {
        Self::with_debounce(client, DEFAULT_DEBOUNCE)
    }

    #[must_use]
    pub fn with_debounce(client: Arc<PlacesClient>, debounce: Duration) -> Self {
        Self {
            client,
            debounce,
            generation: AtomicU64::new(0),
        }
    }

    /// # Errors
    ///
    /// Returns the upstream error of the latest call only; superseded calls
    /// resolve to `Ok(None)`.
    pub async fn suggest(
        &self,
        input: &str,
        bias: Option<GeoPoint>,
    ) -> Result<Option<Vec<Prediction>>, PlacesError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;
        if self.is_stale(generation) {
            return Ok(None);
        }

        let input = input.trim();
        if input.chars().count() < MIN_INPUT_CHARS {
            return Ok(Some(Vec::new()));
        }

        let result = self.client.autocomplete(input, bias).await;
        if self.is_stale(generation) {
            return Ok(None);
        }
        result.map(Some)
    }

    /// Invalidates every pending call.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }
}
