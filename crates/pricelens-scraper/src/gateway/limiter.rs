use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::TransportError;

#[derive(Debug)]
struct LimiterState {
    last_request: HashMap<String, Instant>,
    last_sweep: Instant,
}

/// Per-domain cooldown shared by every caller of a gateway.
///
/// A request within `min_interval` of the previous accepted request to the
/// same domain is rejected, not queued. The whole map is cleared once every
/// `sweep_interval`; there is no per-entry expiry.
#[derive(Debug)]
pub struct DomainRateLimiter {
    min_interval: Duration,
    sweep_interval: Duration,
    state: Mutex<LimiterState>,
}

impl DomainRateLimiter {
    #[must_use]
    pub fn new(min_interval: Duration, sweep_interval: Duration) -> Self {
        Self {
            min_interval,
            sweep_interval,
            state: Mutex::new(LimiterState {
                last_request: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a request to `domain` if its cooldown has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::RateLimited`] with the remaining cooldown
    /// when the previous request to `domain` was less than `min_interval`
    /// ago. A rejected call does not move the domain's timestamp.
    pub fn try_acquire(&self, domain: &str) -> Result<(), TransportError> {
        let now = Instant::now();
        let mut state = self.lock();

        if now.duration_since(state.last_sweep) >= self.sweep_interval {
            tracing::debug!(
                tracked = state.last_request.len(),
                "clearing per-domain rate limit map"
            );
            state.last_request.clear();
            state.last_sweep = now;
        }

        if let Some(last) = state.last_request.get(domain) {
            let elapsed = now.duration_since(*last);
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                return Err(TransportError::RateLimited {
                    domain: domain.to_owned(),
                    retry_after_ms: Some(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX)),
                });
            }
        }

        state.last_request.insert(domain.to_owned(), now);
        Ok(())
    }

    /// Number of domains currently holding a timestamp.
    #[must_use]
    pub fn tracked_domains(&self) -> usize {
        self.lock().last_request.len()
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.last_request.clear();
        state.last_sweep = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> DomainRateLimiter {
        DomainRateLimiter::new(Duration::from_millis(2000), Duration::from_millis(300_000))
    }

    #[tokio::test(start_paused = true)]
    async fn second_request_inside_interval_is_rejected() {
        let limiter = limiter();
        limiter.try_acquire("etsy.com").unwrap();
        tokio::time::advance(Duration::from_millis(1999)).await;
        let err = limiter.try_acquire("etsy.com").unwrap_err();
        assert!(matches!(
            err,
            TransportError::RateLimited { retry_after_ms: Some(1), .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn request_at_interval_boundary_proceeds() {
        let limiter = limiter();
        limiter.try_acquire("etsy.com").unwrap();
        tokio::time::advance(Duration::from_millis(2000)).await;
        assert!(limiter.try_acquire("etsy.com").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_does_not_extend_cooldown() {
        let limiter = limiter();
        limiter.try_acquire("ebay.com").unwrap();
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert!(limiter.try_acquire("ebay.com").is_err());
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(limiter.try_acquire("ebay.com").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn domains_are_independent() {
        let limiter = limiter();
        limiter.try_acquire("amazon.com").unwrap();
        assert!(limiter.try_acquire("walmart.com").is_ok());
        assert_eq!(limiter.tracked_domains(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn map_is_cleared_after_sweep_interval() {
        let limiter = DomainRateLimiter::new(
            Duration::from_millis(2000),
            Duration::from_millis(10_000),
        );
        limiter.try_acquire("a.com").unwrap();
        limiter.try_acquire("b.com").unwrap();
        tokio::time::advance(Duration::from_millis(10_000)).await;
        limiter.try_acquire("c.com").unwrap();
        assert_eq!(limiter.tracked_domains(), 1);
    }

    #[test]
    fn clear_empties_the_map() {
        let limiter = limiter();
        limiter.try_acquire("target.com").unwrap();
        limiter.clear();
        assert_eq!(limiter.tracked_domains(), 0);
        assert!(limiter.try_acquire("target.com").is_ok());
    }
}
