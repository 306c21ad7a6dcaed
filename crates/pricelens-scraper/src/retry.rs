//! Bounded retry with exponential backoff for listing fetches.

use std::future::Future;
use std::time::Duration;

use crate::error::TransportError;

/// Executes `operation` up to `max_attempts` times in total.
///
/// After failed attempt `n` (0-based) the loop sleeps `backoff_base * 2^n`
/// before trying again. Non-retriable errors (see
/// [`TransportError::is_retriable`]) are returned immediately; when attempts
/// run out, the last error is returned.
///
/// | Failed attempt | Sleep before next (base = 1s) |
/// |----------------|-------------------------------|
/// | 0              | 1s                            |
/// | 1              | 2s                            |
/// | 2              | none (`max_attempts = 3` reached) |
pub async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_base: Duration,
    mut operation: F,
) -> Result<T, TransportError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !err.is_retriable() || attempt + 1 >= max_attempts {
            return Err(err);
        }

        let delay = backoff_base.saturating_mul(1u32 << attempt.min(31));
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            kind = err.kind(),
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
