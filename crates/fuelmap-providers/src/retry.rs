//! Retry with exponential back-off and jitter for the Maps client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx, 429, `OVER_QUERY_LIMIT`).
//! API-level refusals and malformed payloads are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::MapsError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 5xx and 429 responses.
/// - [`MapsError::RateLimited`] — the JSON envelope said `OVER_QUERY_LIMIT`.
///
/// **Not retriable:**
/// - [`MapsError::Api`] — key rejected, invalid request; retrying won't fix it.
/// - [`MapsError::NoRoute`] — a definitive answer.
/// - [`MapsError::Deserialize`] — malformed response.
/// - [`MapsError::InvalidBaseUrl`] — configuration error.
pub(crate) fn is_retriable(err: &MapsError) -> bool {
    match err {
        MapsError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| {
                    s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS
                })
        }
        MapsError::RateLimited { .. } => true,
        MapsError::Api { .. }
        | MapsError::NoRoute
        | MapsError::Deserialize { .. }
        | MapsError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt    |
/// |---------|------------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter    |
/// | 2       | 500 ms × 2¹ ± 25 % jitter    |
///
/// Delay is capped at 10 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, MapsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MapsError>>,
{
    const MAX_DELAY_MS: u64 = 10_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "maps transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
