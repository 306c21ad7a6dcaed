use std::sync::Arc;

use pricelens_core::AppConfig;
use pricelens_scraper::{DomainRateLimiter, GatewayConfig, HtmlFetcher, RequestGateway};

use crate::alternative::{AlternativeDataSource, CuratedDatabase, RecordCache};
use crate::enhancer::AccuracyEnhancer;
use crate::monitor::AccuracyMonitor;
use crate::store::{JsonFileStore, MetricsStore};

/// Owner of the state shared by every resolve call: the per-domain rate
/// limiter, the record cache and the accuracy monitor.
///
/// Build one per application session with [`ResolverContext::from_config`],
/// hand out enhancers with [`ResolverContext::enhancer`], and call
/// [`ResolverContext::shutdown`] before exit.
#[derive(Debug, Clone)]
pub struct ResolverContext {
    config: AppConfig,
    limiter: Arc<DomainRateLimiter>,
    cache: Arc<RecordCache>,
    monitor: Arc<AccuracyMonitor>,
}

impl ResolverContext {
    /// Initializes shared state, loading persisted metrics when
    /// `metrics_path` is set.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let gateway = GatewayConfig::from(config);
        let limiter = Arc::new(DomainRateLimiter::new(
            gateway.min_interval,
            gateway.sweep_interval,
        ));
        let monitor = match &config.metrics_path {
            Some(path) => {
                let store: Arc<dyn MetricsStore> = Arc::new(JsonFileStore::new(path.clone()));
                AccuracyMonitor::with_store(config.feedback_capacity, store)
            }
            None => AccuracyMonitor::new(config.feedback_capacity),
        };
        Self {
            config: config.clone(),
            limiter,
            cache: Arc::new(RecordCache::with_capacity(config.record_cache_capacity)),
            monitor: Arc::new(monitor),
        }
    }

    /// Default fallback chain over the shared cache.
    #[must_use]
    pub fn alternative(&self) -> AlternativeDataSource {
        AlternativeDataSource::new(CuratedDatabase::with_defaults(), Arc::clone(&self.cache))
    }

    /// An enhancer wired to this context's limiter, cache and monitor.
    #[must_use]
    pub fn enhancer(&self, fetcher: Arc<dyn HtmlFetcher>) -> AccuracyEnhancer {
        self.enhancer_with(fetcher, self.alternative())
    }

    /// Like [`enhancer`](Self::enhancer), with a caller-built fallback chain
    /// (for example one with extra lookup providers).
    #[must_use]
    pub fn enhancer_with(
        &self,
        fetcher: Arc<dyn HtmlFetcher>,
        alternative: AlternativeDataSource,
    ) -> AccuracyEnhancer {
        let gateway = RequestGateway::with_limiter(
            fetcher,
            Arc::clone(&self.limiter),
            GatewayConfig::from(&self.config),
        );
        AccuracyEnhancer::new(gateway, Arc::new(alternative), Arc::clone(&self.monitor))
            .with_threshold(self.config.cross_reference_threshold)
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn monitor(&self) -> &Arc<AccuracyMonitor> {
        &self.monitor
    }

    #[must_use]
    pub fn limiter(&self) -> &Arc<DomainRateLimiter> {
        &self.limiter
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    /// Flushes metrics to the store and clears the volatile maps.
    pub fn shutdown(&self) {
        self.monitor.flush();
        self.limiter.clear();
        self.cache.clear();
        tracing::debug!("resolver context shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_clears_volatile_state() {
        let context = ResolverContext::from_config(&AppConfig::default());
        context.limiter().try_acquire("etsy.com").unwrap();
        context.cache().insert("https://www.etsy.com/listing/1", Default::default());

        context.shutdown();
        assert_eq!(context.limiter().tracked_domains(), 0);
        assert!(context.cache().is_empty());
    }

    #[test]
    fn cache_capacity_comes_from_config() {
        let config = AppConfig {
            record_cache_capacity: 1,
            ..AppConfig::default()
        };
        let context = ResolverContext::from_config(&config);
        context.cache().insert("https://www.etsy.com/listing/1", Default::default());
        context.cache().insert("https://www.etsy.com/listing/2", Default::default());

        assert_eq!(context.cache().capacity(), 1);
        assert_eq!(context.cache().len(), 1);
        assert!(context.cache().get("https://www.etsy.com/listing/2").is_some());
    }

    #[test]
    fn metrics_path_enables_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let config = AppConfig {
            metrics_path: Some(path.clone()),
            ..AppConfig::default()
        };

        let context = ResolverContext::from_config(&config);
        context.shutdown();
        assert!(path.exists());
    }
}
