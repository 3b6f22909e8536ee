use serde_json::Value;
use venuescout_core::GeoPoint;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::status::UpstreamStatus;
use crate::types::GeometryOnly;

impl PlacesClient {
    /// Resolves free text to a point.
    ///
    /// Tries a place lookup first (`findplacefromtext`, biased toward `bias`
    /// or the caller's IP), then a general address lookup (`geocode`).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Geocoding`] with the last upstream status when
    /// neither lookup yields a location, or a transport error from either call.
    pub async fn geocode(
        &self,
        query: &str,
        bias: Option<GeoPoint>,
    ) -> Result<GeoPoint, PlacesError> {
        let location_bias = self.legacy_bias(bias);
        let body = self
            .fetch_legacy(
                "place/findplacefromtext/json",
                &[
                    ("input", query),
                    ("inputtype", "textquery"),
                    ("fields", "geometry"),
                    ("locationbias", &location_bias),
                ],
            )
            .await?;
        if let Some(point) = first_location(&body, "candidates") {
            tracing::debug!(query, %point, "geocoded via place lookup");
            return Ok(point);
        }

        let body = self
            .fetch_legacy("geocode/json", &[("address", query)])
            .await?;
        if let Some(point) = first_location(&body, "results") {
            tracing::debug!(query, %point, "geocoded via address lookup");
            return Ok(point);
        }

        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();
        tracing::warn!(query, status = %status, "geocoding failed");
        Err(PlacesError::Geocoding { status })
    }
}

/// Location of the first entry under `key`, if the body is `OK` and it is numeric.
fn first_location(body: &Value, key: &str) -> Option<GeoPoint> {
    if !UpstreamStatus::of(body).is_ok() || body.get("status").is_none() {
        return None;
    }
    let first = body.get(key)?.as_array()?.first()?;
    let hit: GeometryOnly = serde_json::from_value(first.clone()).ok()?;
    GeoPoint::new_checked(hit.geometry.location.lat, hit.geometry.location.lng)
}
