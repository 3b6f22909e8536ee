use thiserror::Error;

/// Errors returned by the places access layer.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not finish within the scheduler's per-request timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The upstream answered with a non-2xx HTTP status.
    #[error("upstream returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Neither geocoding endpoint produced a usable location.
    #[error("Geocoding failed: {status}")]
    Geocoding { status: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Every category branch of a fan-out search failed.
    #[error("all {count} category searches failed; first error: {first}")]
    CategoriesFailed { count: usize, first: Box<PlacesError> },
}

impl PlacesError {
    /// Returns `true` for failures worth retrying after a back-off delay.
    ///
    /// Transport failures, timeouts, throttling (429), 5xx responses and
    /// bodies that were not JSON are transient. Everything else is final.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            PlacesError::Http(_)
            | PlacesError::Timeout { .. }
            | PlacesError::Deserialize { .. } => true,
            PlacesError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            PlacesError::Geocoding { .. }
            | PlacesError::InvalidBaseUrl { .. }
            | PlacesError::CategoriesFailed { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_and_server_errors_are_transient() {
        let throttled = PlacesError::HttpStatus {
            status: 429,
            url: "u".into(),
        };
        let unavailable = PlacesError::HttpStatus {
            status: 503,
            url: "u".into(),
        };
        assert!(throttled.is_transient());
        assert!(unavailable.is_transient());
        assert!(PlacesError::Timeout { timeout_ms: 10 }.is_transient());
    }

    #[test]
    fn client_errors_and_geocoding_are_final() {
        let forbidden = PlacesError::HttpStatus {
            status: 403,
            url: "u".into(),
        };
        assert!(!forbidden.is_transient());
        assert!(!PlacesError::Geocoding {
            status: "ZERO_RESULTS".into()
        }
        .is_transient());
    }

    #[test]
    fn geocoding_message_names_status() {
        let err = PlacesError::Geocoding {
            status: "REQUEST_DENIED".into(),
        };
        assert_eq!(err.to_string(), "Geocoding failed: REQUEST_DENIED");
    }
}
