//! The resolve pipeline: acquire, validate, correct, cross-reference,
//! validate again, record.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use pricelens_core::price::parse_price_value;
use pricelens_core::{
    AccuracyEnhancedResult, Platform, ProductField, ProductRecord, ScrapedProduct,
    ValidationResult, SOURCE_CROSS_REFERENCE, SOURCE_CURATED, SOURCE_LIVE_SCRAPER,
};
use pricelens_core::validation::VALID_CONFIDENCE_THRESHOLD;
use pricelens_scraper::{ExtractorRegistry, RequestGateway};

use crate::alternative::{AlternativeDataSource, CURATED_CONFIDENCE};
use crate::error::AccuracyError;
use crate::monitor::AccuracyMonitor;
use crate::validator::Validator;

pub const DEFAULT_CROSS_REFERENCE_THRESHOLD: u8 = 80;
const MIN_CORRECTED_TITLE_LEN: usize = 10;

/// Enrichment step run when a corrected product still scores below the
/// cross-reference threshold.
#[async_trait]
pub trait CrossReference: Send + Sync {
    async fn enrich(&self, url: &str, product: ScrapedProduct) -> ScrapedProduct;
}

/// Returns the product unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait]
impl CrossReference for PassThrough {
    async fn enrich(&self, _url: &str, product: ScrapedProduct) -> ScrapedProduct {
        product
    }
}

pub struct AccuracyEnhancer {
    gateway: RequestGateway,
    registry: Arc<ExtractorRegistry>,
    alternative: Arc<AlternativeDataSource>,
    validator: Validator,
    cross_reference: Arc<dyn CrossReference>,
    monitor: Arc<AccuracyMonitor>,
    threshold: u8,
}

impl std::fmt::Debug for AccuracyEnhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccuracyEnhancer")
            .field("gateway", &self.gateway)
            .field("alternative", &self.alternative)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// Where the step-1 product came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acquired {
    Curated,
    Live,
}

impl AccuracyEnhancer {
    #[must_use]
    pub fn new(
        gateway: RequestGateway,
        alternative: Arc<AlternativeDataSource>,
        monitor: Arc<AccuracyMonitor>,
    ) -> Self {
        Self {
            gateway,
            registry: Arc::new(ExtractorRegistry::with_defaults()),
            alternative,
            validator: Validator::new(),
            cross_reference: Arc::new(PassThrough),
            monitor,
            threshold: DEFAULT_CROSS_REFERENCE_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ExtractorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_cross_reference(mut self, cross_reference: Arc<dyn CrossReference>) -> Self {
        self.cross_reference = cross_reference;
        self
    }

    /// Confidence below which the cross-reference step runs.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Resolves `url` into a validated, confidence-scored product.
    ///
    /// # Errors
    ///
    /// Returns [`AccuracyError::AllSourcesExhausted`] when the curated lookup
    /// misses and the live fetch fails. Nothing else is fatal.
    pub async fn resolve(&self, url: &str) -> Result<AccuracyEnhancedResult, AccuracyError> {
        self.resolve_with_id(url, None).await
    }

    /// Like [`resolve`](Self::resolve), with a caller-supplied product ID
    /// that takes precedence over the one in the URL.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve).
    pub async fn resolve_with_id(
        &self,
        url: &str,
        known_id: Option<&str>,
    ) -> Result<AccuracyEnhancedResult, AccuracyError> {
        let platform = Platform::from_url(url);
        let mut data_sources = Vec::new();

        let (mut product, acquired) = self.acquire(url, known_id, platform).await?;
        data_sources.push(
            match acquired {
                Acquired::Curated => SOURCE_CURATED,
                Acquired::Live => SOURCE_LIVE_SCRAPER,
            }
            .to_owned(),
        );

        let mut validation = self.validator.validate(&product, url);
        let mut corrected_fields = Vec::new();
        if !validation.issues.is_empty() {
            let (fields, contributor) = self
                .correct(url, known_id, &mut product, &validation)
                .await;
            if let Some(contributor) = contributor {
                data_sources.push(format!("{contributor}-correction"));
                validation = self.validator.validate(&product, url);
            }
            corrected_fields = fields;
        }

        if validation.confidence < self.threshold {
            tracing::debug!(url, confidence = validation.confidence, "running cross-reference");
            product = self.cross_reference.enrich(url, product).await;
            data_sources.push(SOURCE_CROSS_REFERENCE.to_owned());
        }

        let report = self.validator.validate(&product, url);
        if acquired == Acquired::Live && report.confidence >= VALID_CONFIDENCE_THRESHOLD {
            self.alternative.cache().remember(url, &product);
        }

        let result = AccuracyEnhancedResult {
            product,
            confidence: report.confidence,
            data_sources,
            validation_report: report,
            corrected_fields,
            timestamp: Utc::now(),
        };
        tracing::info!(
            url,
            %platform,
            confidence = result.confidence,
            sources = ?result.data_sources,
            corrected = result.corrected_fields.len(),
            "resolved listing"
        );
        self.monitor.record_scan_result(&result, url);
        Ok(result)
    }

    async fn acquire(
        &self,
        url: &str,
        known_id: Option<&str>,
        platform: Platform,
    ) -> Result<(ScrapedProduct, Acquired), AccuracyError> {
        if let Some(record) = self.alternative.curated_lookup(url, known_id) {
            let product = ScrapedProduct::from_record(&record, platform, CURATED_CONFIDENCE);
            return Ok((product, Acquired::Curated));
        }

        match self.gateway.fetch(url).await {
            Ok(html) => {
                let product = self.registry.for_url(url).extract(&html);
                Ok((product, Acquired::Live))
            }
            Err(source) => {
                tracing::warn!(url, error = %source, "curated lookup missed and live fetch failed");
                Err(AccuracyError::AllSourcesExhausted {
                    url: url.to_owned(),
                    source,
                })
            }
        }
    }

    /// Runs the field correctors for every flagged field.
    ///
    /// The alternative record is fetched at most once, on the first
    /// correctable issue. Returns the fields actually overwritten (in first
    /// correction order, no duplicates) and the source tag of the record that
    /// supplied them, if any field changed.
    async fn correct(
        &self,
        url: &str,
        known_id: Option<&str>,
        product: &mut ScrapedProduct,
        validation: &ValidationResult,
    ) -> (Vec<ProductField>, Option<String>) {
        let mut corrected = Vec::new();
        let mut alternative: Option<ProductRecord> = None;

        for issue in &validation.issues {
            if !matches!(
                issue.field,
                ProductField::Price | ProductField::Title | ProductField::Seller
            ) || corrected.contains(&issue.field)
            {
                continue;
            }
            if alternative.is_none() {
                alternative = Some(self.alternative.lookup_with_id(url, known_id).await);
            }
            let Some(record) = alternative.as_ref() else {
                continue;
            };

            if apply_correction(issue.field, record, product) {
                tracing::debug!(url, field = %issue.field, source = %record.source, "field corrected");
                corrected.push(issue.field);
            } else {
                tracing::debug!(
                    url,
                    field = %issue.field,
                    source = %record.source,
                    "no usable alternative value; keeping original"
                );
            }
        }

        let contributor = alternative
            .filter(|_| !corrected.is_empty())
            .map(|record| record.source);
        (corrected, contributor)
    }
}

/// Overwrites `field` from `record` when the alternative value is usable and
/// differs from the current one. Returns whether the field changed.
fn apply_correction(field: ProductField, record: &ProductRecord, product: &mut ScrapedProduct) -> bool {
    let (candidate, target) = match field {
        ProductField::Price => {
            let usable = parse_price_value(&record.price).is_some_and(|v| v > 0.0);
            (usable.then_some(&record.price), &mut product.price)
        }
        ProductField::Title => {
            let usable = record.name.trim().chars().count() > MIN_CORRECTED_TITLE_LEN;
            (usable.then_some(&record.name), &mut product.name)
        }
        ProductField::Seller => {
            let usable = !record.seller.trim().is_empty();
            (usable.then_some(&record.seller), &mut product.seller)
        }
        _ => return false,
    };
    match candidate {
        Some(value) if value.trim() != target.as_str() => {
            *target = value.trim().to_owned();
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        ProductRecord {
            name: "Hand Poured Soy Candle Set".to_owned(),
            price: "$24.00".to_owned(),
            seller: "WickAndWax".to_owned(),
            source: "echo-api".to_owned(),
            ..ProductRecord::default()
        }
    }

    #[test]
    fn price_correction_needs_positive_amount() {
        let mut product = ScrapedProduct::placeholder(Platform::Etsy);
        assert!(apply_correction(ProductField::Price, &record(), &mut product));
        assert_eq!(product.price, "$24.00");

        let mut product = ScrapedProduct::placeholder(Platform::Etsy);
        let empty = ProductRecord::default();
        assert!(!apply_correction(ProductField::Price, &empty, &mut product));
        assert_eq!(product.price, "$0.00");
    }

    #[test]
    fn title_correction_needs_more_than_ten_chars() {
        let mut product = ScrapedProduct::placeholder(Platform::Etsy);
        let short = ProductRecord {
            name: "Candle Set".to_owned(),
            ..ProductRecord::default()
        };
        assert!(!apply_correction(ProductField::Title, &short, &mut product));
        assert!(apply_correction(ProductField::Title, &record(), &mut product));
        assert_eq!(product.name, "Hand Poured Soy Candle Set");
    }

    #[test]
    fn identical_value_is_not_a_correction() {
        let mut product = ScrapedProduct::placeholder(Platform::Etsy);
        product.seller = "WickAndWax".to_owned();
        assert!(!apply_correction(ProductField::Seller, &record(), &mut product));
    }

    #[test]
    fn uncorrectable_fields_are_left_alone() {
        let mut product = ScrapedProduct::placeholder(Platform::Etsy);
        assert!(!apply_correction(ProductField::Images, &record(), &mut product));
    }
}
