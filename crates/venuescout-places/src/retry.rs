//! Retry with exponential back-off for upstream JSON calls.
//!
//! [`fetch_json_with_retry`] retries two kinds of trouble on the same
//! schedule: transient transport errors (see [`PlacesError::is_transient`])
//! and bodies whose in-body status is [`UpstreamStatus::Retryable`].
//! When attempts run out a retryable body is returned as-is, while a
//! transport error is raised.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use venuescout_core::AppConfig;

use crate::error::PlacesError;
use crate::status::UpstreamStatus;

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least 1.
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(400),
        }
    }
}

impl From<&AppConfig> for RetryPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }
}

impl RetryPolicy {
    /// Sleep before attempt `attempt + 1`: `base × 2^(attempt-1)`, capped at 60 s.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let base_ms = u64::try_from(self.backoff_base.as_millis()).unwrap_or(MAX_DELAY_MS);
        let computed = base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
        Duration::from_millis(computed.min(MAX_DELAY_MS))
    }
}

/// Runs `operation` until it yields a non-retryable body or attempts run out.
///
/// | Attempt | Sleep before next attempt (base 400 ms) |
/// |---------|-----------------------------------------|
/// | 1       | 400 ms                                  |
/// | 2       | 800 ms                                  |
///
/// # Errors
///
/// Returns the operation's error immediately when it is not transient, or the
/// last transient error once all attempts are spent.
pub async fn fetch_json_with_retry<F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<Value, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value, PlacesError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(body) => {
                let status = UpstreamStatus::of(&body);
                if !status.is_retryable() {
                    return Ok(body);
                }
                if attempt >= max_attempts {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        status = %status,
                        "upstream still signalling failure after final attempt"
                    );
                    return Ok(body);
                }
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    status = %status,
                    "upstream status retryable, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                if !err.is_transient() || attempt >= max_attempts {
                    return Err(err);
                }
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "upstream transient error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
        attempt += 1;
    }
}
