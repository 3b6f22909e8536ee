//! The upstream's in-body `"status"` field.
//!
//! The legacy endpoints answer HTTP 200 even for failures and report the
//! outcome in the JSON body instead. The v1 endpoints carry no status at all,
//! which counts as success.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamStatus {
    Ok,
    ZeroResults,
    /// Throttling or transient upstream trouble; worth another attempt.
    Retryable(String),
    /// Anything else, e.g. `REQUEST_DENIED`. Returned to the caller as data.
    Terminal(String),
}

const RETRYABLE_STATUSES: &[&str] = &["OVER_QUERY_LIMIT", "INVALID_REQUEST", "UNKNOWN_ERROR"];

impl UpstreamStatus {
    #[must_use]
    pub fn of(body: &Value) -> Self {
        match body.get("status").and_then(Value::as_str) {
            None | Some("OK") => UpstreamStatus::Ok,
            Some("ZERO_RESULTS") => UpstreamStatus::ZeroResults,
            Some(s) if RETRYABLE_STATUSES.contains(&s) => UpstreamStatus::Retryable(s.to_string()),
            Some(s) => UpstreamStatus::Terminal(s.to_string()),
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, UpstreamStatus::Retryable(_))
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, UpstreamStatus::Ok)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            UpstreamStatus::Ok => "OK",
            UpstreamStatus::ZeroResults => "ZERO_RESULTS",
            UpstreamStatus::Retryable(s) | UpstreamStatus::Terminal(s) => s,
        }
    }
}

impl std::fmt::Display for UpstreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
