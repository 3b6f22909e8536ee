//! Search intents and the cache keys derived from them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::geo::GeoPoint;

/// What a collaborator wants to find.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchIntent {
    /// Free-text query, e.g. `"stadium"` or a place name.
    pub query: Option<String>,
    /// Bias center; `None` lets the upstream infer location from the caller's IP.
    pub center: Option<GeoPoint>,
    /// Selected category ids. Empty means "any category".
    #[serde(default)]
    pub types: Vec<String>,
}

impl SearchIntent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn with_center(mut self, center: GeoPoint) -> Self {
        self.center = Some(center);
        self
    }

    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// The query trimmed and whitespace-collapsed, or `None` when blank.
    #[must_use]
    pub fn query_text(&self) -> Option<String> {
        let collapsed = collapse_whitespace(self.query.as_deref().unwrap_or_default());
        (!collapsed.is_empty()).then_some(collapsed)
    }

    /// The center if its coordinates are usable; invalid ones mean no bias.
    #[must_use]
    pub fn bias(&self) -> Option<GeoPoint> {
        self.center.and_then(GeoPoint::validated)
    }

    /// Category ids in caller order with blanks and repeats removed.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.types.len());
        for t in &self.types {
            let t = t.trim();
            if !t.is_empty() && !out.iter().any(|seen| seen == t) {
                out.push(t.to_string());
            }
        }
        out
    }

    /// True when nothing in the intent could drive an upstream search.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_text().is_none() && self.bias().is_none() && self.categories().is_empty()
    }

    #[must_use]
    pub fn fingerprint(&self) -> SearchFingerprint {
        SearchFingerprint::new(self)
    }
}

/// Cache key for a [`SearchIntent`].
///
/// Equal for intents that differ only in query case or spacing, or in
/// category order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchFingerprint {
    query: String,
    center: Option<String>,
    categories: String,
    bucket: Option<u64>,
}

impl SearchFingerprint {
    #[must_use]
    pub fn new(intent: &SearchIntent) -> Self {
        let query = intent.query_text().unwrap_or_default().to_lowercase();
        let center = intent
            .bias()
            .map(|p| format!("{:.6},{:.6}", p.lat, p.lng));

        let mut categories = intent.categories();
        categories.sort();
        categories.dedup();

        Self {
            query,
            center,
            categories: categories.join(","),
            bucket: None,
        }
    }

    /// Scopes the key to a time bucket so results go stale after a window.
    #[must_use]
    pub fn with_freshness_bucket(mut self, bucket: u64) -> Self {
        self.bucket = Some(bucket);
        self
    }

    #[must_use]
    pub fn bucket(&self) -> Option<u64> {
        self.bucket
    }

    /// Stable SHA-256 hex digest, safe to log.
    #[must_use]
    pub fn digest(&self) -> String {
        let input = format!(
            "{}\x00{}\x00{}\x00{}",
            self.query,
            self.center.as_deref().unwrap_or(""),
            self.categories,
            self.bucket.map(|b| b.to_string()).unwrap_or_default(),
        );
        format!("{:x}", Sha256::digest(input.as_bytes()))
    }
}

impl std::fmt::Display for SearchFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.digest()[..12])
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
