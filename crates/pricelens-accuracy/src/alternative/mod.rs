//! Fallback product data for listings the live page cannot (fully) serve.
//!
//! [`AlternativeDataSource::lookup`] walks an ordered chain and returns the
//! first record any step produces:
//!
//! 1. curated database, keyed by the platform product ID
//! 2. registered [`LookupProvider`]s, in registration order (external
//!    product-data APIs, generic product databases)
//! 3. the [`RecordCache`] of earlier high-confidence resolutions
//! 4. keyword heuristics over the URL slug
//! 5. a URL-pattern best guess, which always succeeds
//!
//! Failed steps are logged and skipped; the chain itself never fails.

mod cache;
mod curated;
mod heuristic;
mod product_id;

use std::sync::Arc;

use async_trait::async_trait;

use pricelens_core::ProductRecord;

use crate::error::LookupError;

pub use cache::{RecordCache, DEFAULT_RECORD_CACHE_CAPACITY, SOURCE_RECORD_CACHE};
pub use curated::{CuratedDatabase, CURATED_CONFIDENCE};
pub use heuristic::{keyword_match, url_pattern_guess, SOURCE_KEYWORD_HEURISTIC, SOURCE_URL_PATTERN};
pub use product_id::ProductId;

/// A pluggable product-data service keyed by the same ID scheme as the
/// curated table.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Short name used in logs and as the record's provenance tag.
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Returns [`LookupError`] when the provider has no record or cannot be
    /// reached. The chain logs the error and moves on.
    async fn lookup(&self, url: &str, id: Option<&ProductId>) -> Result<ProductRecord, LookupError>;
}

pub struct AlternativeDataSource {
    curated: CuratedDatabase,
    providers: Vec<Arc<dyn LookupProvider>>,
    cache: Arc<RecordCache>,
}

impl std::fmt::Debug for AlternativeDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlternativeDataSource")
            .field("curated", &self.curated.len())
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl AlternativeDataSource {
    #[must_use]
    pub fn new(curated: CuratedDatabase, cache: Arc<RecordCache>) -> Self {
        Self {
            curated,
            providers: Vec::new(),
            cache,
        }
    }

    /// Appends a provider to step 2 of the chain.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn LookupProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    /// Step 1 only: the curated database.
    #[must_use]
    pub fn curated_lookup(&self, url: &str, known_id: Option<&str>) -> Option<ProductRecord> {
        let hit = self.curated.lookup(url, known_id);
        if hit.is_some() {
            tracing::debug!(url, "curated database hit");
        }
        hit
    }

    /// Runs the full chain for `url`.
    pub async fn lookup(&self, url: &str) -> ProductRecord {
        self.lookup_with_id(url, None).await
    }

    /// Runs the full chain, preferring `known_id` over the URL's own ID.
    pub async fn lookup_with_id(&self, url: &str, known_id: Option<&str>) -> ProductRecord {
        if let Some(record) = self.curated_lookup(url, known_id) {
            return record;
        }
        tracing::debug!(url, step = "curated", "alternative source missed");

        let id = ProductId::resolve(url, known_id);
        for provider in &self.providers {
            match provider.lookup(url, id.as_ref()).await {
                Ok(mut record) => {
                    if record.source.is_empty() {
                        record.source = provider.name().to_owned();
                    }
                    tracing::debug!(url, provider = provider.name(), "lookup provider hit");
                    return record;
                }
                Err(err) => {
                    tracing::info!(url, provider = provider.name(), error = %err, "lookup provider failed");
                }
            }
        }

        if let Some(record) = self.cache.get(url) {
            tracing::debug!(url, "record cache hit");
            return record;
        }
        tracing::debug!(url, step = "cache", "alternative source missed");

        if let Some(record) = keyword_match(url) {
            tracing::debug!(url, category = %record.category, "keyword heuristic matched");
            return record;
        }
        tracing::debug!(url, step = "keyword-heuristic", "alternative source missed");

        tracing::info!(url, "falling back to URL-pattern guess");
        url_pattern_guess(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl LookupProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing-api"
        }

        async fn lookup(&self, url: &str, _id: Option<&ProductId>) -> Result<ProductRecord, LookupError> {
            Err(LookupError::Unavailable {
                provider: self.name().to_owned(),
                reason: format!("no route for {url}"),
            })
        }
    }

    struct EchoIdProvider;

    #[async_trait]
    impl LookupProvider for EchoIdProvider {
        fn name(&self) -> &str {
            "echo-api"
        }

        async fn lookup(&self, url: &str, id: Option<&ProductId>) -> Result<ProductRecord, LookupError> {
            let id = id.ok_or_else(|| LookupError::NotFound {
                provider: self.name().to_owned(),
                url: url.to_owned(),
            })?;
            Ok(ProductRecord {
                name: format!("Catalog item {}", id.value),
                price: "$10.00".to_owned(),
                confidence: 0.7,
                ..ProductRecord::default()
            })
        }
    }

    fn source() -> AlternativeDataSource {
        AlternativeDataSource::new(CuratedDatabase::with_defaults(), Arc::new(RecordCache::new()))
    }

    #[tokio::test]
    async fn curated_hit_short_circuits() {
        let record = source()
            .with_provider(Arc::new(EchoIdProvider))
            .lookup("https://www.etsy.com/listing/4312889571/personalized-leather-keychain")
            .await;
        assert_eq!(record.price, "$19.95");
    }

    #[tokio::test]
    async fn failing_provider_is_skipped() {
        let record = source()
            .with_provider(Arc::new(FailingProvider))
            .with_provider(Arc::new(EchoIdProvider))
            .lookup("https://www.ebay.com/itm/256012345678")
            .await;
        assert_eq!(record.name, "Catalog item 256012345678");
        assert_eq!(record.source, "echo-api");
    }

    #[tokio::test]
    async fn cache_precedes_heuristics() {
        let alt = source();
        alt.cache().insert(
            "https://www.etsy.com/listing/9/engraved-leather-wallet",
            ProductRecord {
                name: "Cached Wallet".to_owned(),
                source: SOURCE_RECORD_CACHE.to_owned(),
                ..ProductRecord::default()
            },
        );
        let record = alt
            .lookup("https://www.etsy.com/listing/9/engraved-leather-wallet")
            .await;
        assert_eq!(record.name, "Cached Wallet");
    }

    #[tokio::test]
    async fn chain_ends_in_url_guess() {
        let record = source()
            .with_provider(Arc::new(FailingProvider))
            .lookup("https://example.org/")
            .await;
        assert_eq!(record.source, SOURCE_URL_PATTERN);
    }

    #[tokio::test]
    async fn known_id_reaches_providers() {
        let record = source()
            .with_provider(Arc::new(EchoIdProvider))
            .lookup_with_id("https://www.ebay.com/itm/256012345678", Some("111122223333"))
            .await;
        assert_eq!(record.name, "Catalog item 111122223333");
    }
}
