//! Conversion from upstream place records to [`Venue`]s.
//!
//! Both the v1 shape and the legacy shape are accepted. A record without an
//! id or without numeric coordinates is dropped; its siblings are kept.

use reqwest::Url;
use serde_json::Value;
use venuescout_core::{primary_type_for, OpenState, Venue, ADDRESS_NOT_SPECIFIED};

use crate::types::{LegacyPlace, PlaceV1};

const PHOTO_MAX_WIDTH: &str = "400";

/// Builds media URLs for photo references. Photos are never fetched here.
#[derive(Debug, Clone)]
pub struct PhotoUrls {
    places_base: Url,
    maps_base: Url,
    api_key: String,
}

impl PhotoUrls {
    /// Both base URLs must end with a slash.
    #[must_use]
    pub fn new(places_base: Url, maps_base: Url, api_key: &str) -> Self {
        Self {
            places_base,
            maps_base,
            api_key: api_key.to_owned(),
        }
    }

    /// `{places}/v1/{photo_name}/media?maxWidthPx=400&key=…`
    #[must_use]
    pub fn v1(&self, photo_name: &str) -> Option<String> {
        let name = photo_name.trim_matches('/');
        if name.is_empty() {
            return None;
        }
        let mut url = self.places_base.join(&format!("v1/{name}/media")).ok()?;
        url.query_pairs_mut()
            .append_pair("maxWidthPx", PHOTO_MAX_WIDTH)
            .append_pair("key", &self.api_key);
        Some(url.into())
    }

    /// `{maps}/maps/api/place/photo?maxwidth=400&photoreference=…&key=…`
    #[must_use]
    pub fn legacy(&self, photo_reference: &str) -> Option<String> {
        if photo_reference.is_empty() {
            return None;
        }
        let mut url = self.maps_base.join("maps/api/place/photo").ok()?;
        url.query_pairs_mut()
            .append_pair("maxwidth", PHOTO_MAX_WIDTH)
            .append_pair("photoreference", photo_reference)
            .append_pair("key", &self.api_key);
        Some(url.into())
    }
}

/// Normalizes a list of records of either shape, in order.
#[must_use]
pub fn normalize_records(records: &[Value], photos: &PhotoUrls) -> Vec<Venue> {
    records
        .iter()
        .filter_map(|record| normalize_record(record, photos))
        .collect()
}

/// Normalizes one record, or `None` if it is malformed.
#[must_use]
pub fn normalize_record(record: &Value, photos: &PhotoUrls) -> Option<Venue> {
    if is_legacy_shape(record) {
        match serde_json::from_value::<LegacyPlace>(record.clone()) {
            Ok(place) => from_legacy(place, photos),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed legacy place record");
                None
            }
        }
    } else {
        match serde_json::from_value::<PlaceV1>(record.clone()) {
            Ok(place) => from_v1(place, photos),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed place record");
                None
            }
        }
    }
}

fn is_legacy_shape(record: &Value) -> bool {
    record.get("place_id").is_some() || record.get("geometry").is_some()
}

fn from_v1(place: PlaceV1, photos: &PhotoUrls) -> Option<Venue> {
    let id = non_blank(place.id)?;
    let location = venuescout_core::GeoPoint::new_checked(
        place.location.latitude,
        place.location.longitude,
    )?;
    let name = place
        .display_name
        .and_then(|d| d.text)
        .and_then(non_blank)
        .unwrap_or_else(|| id.clone());
    let address = place
        .formatted_address
        .and_then(non_blank)
        .unwrap_or_else(|| ADDRESS_NOT_SPECIFIED.to_string());
    let photo_url = place
        .photos
        .first()
        .and_then(|p| p.name.as_deref())
        .and_then(|name| photos.v1(name));
    let open_state = OpenState::from(place.current_opening_hours.and_then(|h| h.open_now));

    Some(Venue {
        primary_type: primary_type_for(&place.types),
        id,
        name,
        address,
        location,
        rating: place.rating.as_ref().and_then(Value::as_f64),
        types: place.types,
        photo_url,
        open_state,
        price_level: place.price_level.as_ref().and_then(parse_price_level),
    })
}

fn from_legacy(place: LegacyPlace, photos: &PhotoUrls) -> Option<Venue> {
    let id = non_blank(place.place_id)?;
    let loc = place.geometry.location;
    let location = venuescout_core::GeoPoint::new_checked(loc.lat, loc.lng)?;
    let name = place.name.and_then(non_blank).unwrap_or_else(|| id.clone());
    let address = place
        .formatted_address
        .and_then(non_blank)
        .or_else(|| place.vicinity.and_then(non_blank))
        .unwrap_or_else(|| ADDRESS_NOT_SPECIFIED.to_string());
    let photo_url = place
        .photos
        .first()
        .and_then(|p| p.photo_reference.as_deref())
        .and_then(|reference| photos.legacy(reference));
    let open_state = OpenState::from(place.opening_hours.and_then(|h| h.open_now));

    Some(Venue {
        primary_type: primary_type_for(&place.types),
        id,
        name,
        address,
        location,
        rating: place.rating.as_ref().and_then(Value::as_f64),
        types: place.types,
        photo_url,
        open_state,
        price_level: place.price_level.as_ref().and_then(parse_price_level),
    })
}

/// Accepts `0..=4` as a number or the v1 `PRICE_LEVEL_*` names.
fn parse_price_level(raw: &Value) -> Option<u8> {
    match raw {
        Value::Number(n) => n
            .as_u64()
            .filter(|v| *v <= 4)
            .and_then(|v| u8::try_from(v).ok()),
        Value::String(s) => match s.as_str() {
            "PRICE_LEVEL_FREE" => Some(0),
            "PRICE_LEVEL_INEXPENSIVE" => Some(1),
            "PRICE_LEVEL_MODERATE" => Some(2),
            "PRICE_LEVEL_EXPENSIVE" => Some(3),
            "PRICE_LEVEL_VERY_EXPENSIVE" => Some(4),
            _ => None,
        },
        _ => None,
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
