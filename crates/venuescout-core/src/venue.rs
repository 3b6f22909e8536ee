use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Address shown when the upstream record carries none.
pub const ADDRESS_NOT_SPECIFIED: &str = "Address not specified";

/// Fallback when a venue carries no type tags at all.
const DEFAULT_PRIMARY_TYPE: &str = "establishment";

/// Dominant categories, most specific first.
const PRIMARY_TYPE_PRIORITY: &[&str] = &[
    "gym",
    "stadium",
    "golf_course",
    "swimming_pool",
    "sports_complex",
    "sports_club",
];

/// Whether the venue is open right now, as reported upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenState {
    Open,
    Closed,
    #[default]
    Unknown,
}

impl From<Option<bool>> for OpenState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => OpenState::Open,
            Some(false) => OpenState::Closed,
            None => OpenState::Unknown,
        }
    }
}

/// A search result normalized from any upstream place shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Upstream place ID; the de-duplication and list key.
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub rating: Option<f64>,
    /// Upstream type tags plus any catalog categories unioned in by fan-out.
    pub types: Vec<String>,
    pub photo_url: Option<String>,
    pub open_state: OpenState,
    /// 0 (free) through 4 (very expensive).
    pub price_level: Option<u8>,
    pub primary_type: String,
}

impl Venue {
    /// Appends `tag` unless already present, then refreshes `primary_type`.
    pub fn add_type(&mut self, tag: &str) {
        if !self.types.iter().any(|t| t == tag) {
            self.types.push(tag.to_owned());
        }
        self.primary_type = primary_type_for(&self.types);
    }

    /// Unions `other`'s types into `self`, keeping `self`'s order first.
    pub fn merge_types(&mut self, other: &[String]) {
        for tag in other {
            if !self.types.iter().any(|t| t == tag) {
                self.types.push(tag.clone());
            }
        }
        self.primary_type = primary_type_for(&self.types);
    }
}

/// Picks the dominant category from a list of type tags.
#[must_use]
pub fn primary_type_for(types: &[String]) -> String {
    PRIMARY_TYPE_PRIORITY
        .iter()
        .find(|candidate| types.iter().any(|t| t == *candidate))
        .map(|s| (*s).to_string())
        .or_else(|| types.first().cloned())
        .unwrap_or_else(|| DEFAULT_PRIMARY_TYPE.to_string())
}
