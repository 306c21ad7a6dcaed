//! Rate-limited, retrying access to listing pages.

mod http;
mod limiter;
mod user_agents;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use pricelens_core::{extract_host, AppConfig};

use crate::error::TransportError;
use crate::retry::retry_with_backoff;

pub use http::HttpFetcher;
pub use limiter::DomainRateLimiter;
pub use user_agents::UserAgentPool;

/// Host-supplied capability that fetches raw markup for a URL.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`TransportError`] describing why the page could not be
    /// fetched.
    async fn fetch_html(
        &self,
        url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<String, TransportError>;
}

/// Timing knobs for a [`RequestGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    pub request_timeout: Duration,
    pub min_interval: Duration,
    pub sweep_interval: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for GatewayConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            min_interval: Duration::from_millis(config.rate_limit_interval_ms),
            sweep_interval: Duration::from_millis(config.rate_limit_sweep_ms),
            max_attempts: config.max_attempts,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }
}

/// Per-domain rate limiting plus bounded retry around an [`HtmlFetcher`].
///
/// The rate-limit check runs once per `fetch` call, before the first
/// attempt: a domain still cooling down fails fast with
/// [`TransportError::RateLimited`] and nothing is fetched. Retries within one
/// call are paced by the backoff schedule only.
#[derive(Clone)]
pub struct RequestGateway {
    fetcher: Arc<dyn HtmlFetcher>,
    limiter: Arc<DomainRateLimiter>,
    user_agents: UserAgentPool,
    config: GatewayConfig,
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway")
            .field("limiter", &self.limiter)
            .field("user_agents", &self.user_agents.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RequestGateway {
    /// Gateway with its own rate limiter.
    #[must_use]
    pub fn new(fetcher: Arc<dyn HtmlFetcher>, config: GatewayConfig) -> Self {
        let limiter = Arc::new(DomainRateLimiter::new(
            config.min_interval,
            config.sweep_interval,
        ));
        Self::with_limiter(fetcher, limiter, config)
    }

    /// Gateway sharing an existing limiter, so several gateways observe one
    /// per-domain cooldown.
    #[must_use]
    pub fn with_limiter(
        fetcher: Arc<dyn HtmlFetcher>,
        limiter: Arc<DomainRateLimiter>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            fetcher,
            limiter,
            user_agents: UserAgentPool::default(),
            config,
        }
    }

    #[must_use]
    pub fn with_user_agents(mut self, user_agents: UserAgentPool) -> Self {
        self.user_agents = user_agents;
        self
    }

    #[must_use]
    pub fn limiter(&self) -> &Arc<DomainRateLimiter> {
        &self.limiter
    }

    /// Fetches the markup for `url`.
    ///
    /// # Errors
    ///
    /// - [`TransportError::RateLimited`] when the domain was hit less than
    ///   the configured interval ago (not retried), or the last attempt got
    ///   an HTTP 429.
    /// - The last attempt's error once `max_attempts` retriable failures
    ///   have occurred, or the first non-retriable error.
    pub async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        let domain = extract_host(url);
        if let Err(err) = self.limiter.try_acquire(&domain) {
            tracing::info!(%domain, "request rejected by per-domain rate limit");
            return Err(err);
        }

        let timeout = self.config.request_timeout;
        let result = retry_with_backoff(
            self.config.max_attempts,
            self.config.backoff_base,
            |attempt| {
                let user_agent = self.user_agents.pick().to_owned();
                async move {
                    tracing::debug!(url, attempt, %user_agent, "fetching listing");
                    self.fetcher.fetch_html(url, &user_agent, timeout).await
                }
            },
        )
        .await;

        match &result {
            Ok(html) => tracing::debug!(url, bytes = html.len(), "listing fetched"),
            Err(err) => tracing::warn!(url, kind = err.kind(), error = %err, "listing fetch failed"),
        }
        result
    }
}
