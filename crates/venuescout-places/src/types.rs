//! Wire types for the places endpoints.
//!
//! Response records are deserialized one at a time so a single malformed
//! record never poisons its siblings. Fields whose upstream type varies
//! (`rating`, `price_level`) stay as raw [`Value`]s and are interpreted
//! during normalization. Every other optional field is read leniently: a
//! value of the wrong type reads as absent. Only `id` and the coordinates
//! are strict.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const SEARCH_TEXT_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.location,places.rating,places.types,places.priceLevel,places.photos,\
places.currentOpeningHours";

// ---------------------------------------------------------------------------
// v1 `places:searchText`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextRequest {
    pub text_query: String,
    pub language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_bias: Option<LocationBias>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationBias {
    pub circle: Circle,
}

#[derive(Debug, Clone, Serialize)]
pub struct Circle {
    pub center: LatLng,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceV1 {
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<LocalizedText>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatted_address: Option<String>,
    pub location: LatLng,
    pub rating: Option<Value>,
    #[serde(default, deserialize_with = "string_list")]
    pub types: Vec<String>,
    pub price_level: Option<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub photos: Vec<PhotoV1>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_opening_hours: Option<OpeningHoursV1>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedText {
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoV1 {
    /// Resource name, e.g. `places/{id}/photos/{ref}`.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHoursV1 {
    #[serde(default, deserialize_with = "lenient")]
    pub open_now: Option<bool>,
}

// ---------------------------------------------------------------------------
// Legacy JSON endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyPlace {
    pub place_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    pub geometry: LegacyGeometry,
    #[serde(default, deserialize_with = "lenient")]
    pub formatted_address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub vicinity: Option<String>,
    pub rating: Option<Value>,
    #[serde(default, deserialize_with = "string_list")]
    pub types: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub opening_hours: Option<LegacyOpeningHours>,
    pub price_level: Option<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub photos: Vec<LegacyPhoto>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LegacyGeometry {
    pub location: LegacyLatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LegacyLatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyOpeningHours {
    #[serde(default, deserialize_with = "lenient")]
    pub open_now: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyPhoto {
    #[serde(default, deserialize_with = "lenient")]
    pub photo_reference: Option<String>,
}

/// A `findplacefromtext` candidate or a `geocode` result.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeometryOnly {
    pub geometry: LegacyGeometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    pub place_id: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub types: Vec<String>,
}

/// An address suggestion offered while the user types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub id: String,
    pub description: String,
    pub types: Vec<String>,
}

impl From<RawPrediction> for Prediction {
    fn from(raw: RawPrediction) -> Self {
        Self {
            id: raw.place_id.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            types: raw.types,
        }
    }
}

/// Reads any JSON value, keeping it only if it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

/// An array read element by element; mistyped elements become defaults.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// The string entries of an array. `null` and non-arrays read as empty.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn search_text_request_serializes_camel_case() {
        let req = SearchTextRequest {
            text_query: "gym".into(),
            language_code: "en".into(),
            location_bias: Some(LocationBias {
                circle: Circle {
                    center: LatLng {
                        latitude: 1.5,
                        longitude: -2.5,
                    },
                    radius: 5000.0,
                },
            }),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["textQuery"], "gym");
        assert_eq!(value["languageCode"], "en");
        assert_eq!(value["locationBias"]["circle"]["center"]["latitude"], 1.5);
        assert_eq!(value["locationBias"]["circle"]["radius"], 5000.0);
    }

    #[test]
    fn search_text_request_omits_absent_bias() {
        let req = SearchTextRequest {
            text_query: "pool".into(),
            language_code: "en".into(),
            location_bias: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("locationBias").is_none());
    }

    #[test]
    fn v1_place_rejects_string_coordinates() {
        let raw = json!({
            "id": "x",
            "location": { "latitude": "12.0", "longitude": 3.0 }
        });
        assert!(serde_json::from_value::<PlaceV1>(raw).is_err());
    }

    #[test]
    fn field_mask_lists_all_requested_fields() {
        assert_eq!(SEARCH_TEXT_FIELD_MASK.split(',').count(), 9);
        assert!(!SEARCH_TEXT_FIELD_MASK.contains(' '));
    }

    #[test]
    fn prediction_defaults_missing_fields() {
        let raw: RawPrediction = serde_json::from_value(json!({ "description": "Paris" })).unwrap();
        let p = Prediction::from(raw);
        assert_eq!(p.id, "");
        assert_eq!(p.description, "Paris");
        assert!(p.types.is_empty());
    }
}
