//! Retry utilities for marketplace page fetches.
//!
//! Only network-level failures are retried. Bot-detection blocks and
//! unexpected statuses are returned immediately: retrying a challenge page
//! makes the request pattern more conspicuous, not less.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::Http`]: connection reset, DNS failure, timeout.
///
/// Non-retriable errors (propagated immediately):
/// - [`ScraperError::Blocked`]: HTTP 503 or a challenge page.
/// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
/// - [`ScraperError::InvalidUrl`] and [`ScraperError::Extraction`].
fn is_retriable(err: &ScraperError) -> bool {
    matches!(err, ScraperError::Http(_))
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts after the
/// first try. If all retries are exhausted the last error is returned.
///
/// With `max_retries = 1` the operation is attempted at most twice.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
