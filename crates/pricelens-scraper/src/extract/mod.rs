//! Listing-page extraction.
//!
//! Each storefront is served by a [`PlatformExtractor`]. The
//! [`ExtractorRegistry`] maps host predicates to extractors so new platforms
//! can be registered without touching the dispatch code.

pub(crate) mod html;
pub mod jsonld;
pub mod platforms;
pub mod profile;
pub mod rules;

use std::fmt;
use std::sync::Arc;

use pricelens_core::{extract_host, Platform, ScrapedProduct};

pub use profile::{ConfidenceMarker, DomRules, ExtractionProfile, PriceBounds};
pub use rules::{FieldRules, Page, Rule};

/// Turns raw listing markup into a [`ScrapedProduct`].
///
/// Extraction never fails: fields no rule could fill keep their documented
/// defaults.
pub trait PlatformExtractor: Send + Sync {
    fn platform(&self) -> Platform;

    fn extract(&self, html: &str) -> ScrapedProduct;
}

/// A [`PlatformExtractor`] driven by an [`ExtractionProfile`].
#[derive(Debug)]
pub struct ProfileExtractor {
    profile: ExtractionProfile,
}

impl ProfileExtractor {
    #[must_use]
    pub fn new(profile: ExtractionProfile) -> Self {
        Self { profile }
    }

    /// Extractor backed by the built-in profile for `platform`.
    #[must_use]
    pub fn builtin(platform: Platform) -> Self {
        Self::new(platforms::profile_for(platform))
    }
}

impl PlatformExtractor for ProfileExtractor {
    fn platform(&self) -> Platform {
        self.profile.platform()
    }

    fn extract(&self, html: &str) -> ScrapedProduct {
        let product = self.profile.extract(html);
        tracing::debug!(
            platform = %product.source,
            confidence = product.confidence,
            price = %product.price,
            "extracted listing"
        );
        product
    }
}

type HostMatcher = Box<dyn Fn(&str) -> bool + Send + Sync>;

struct Entry {
    matches: HostMatcher,
    extractor: Arc<dyn PlatformExtractor>,
}

/// Host-predicate → extractor registry.
pub struct ExtractorRegistry {
    entries: Vec<Entry>,
    fallback: Arc<dyn PlatformExtractor>,
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field(
                "platforms",
                &self
                    .entries
                    .iter()
                    .map(|e| e.extractor.platform())
                    .collect::<Vec<_>>(),
            )
            .field("fallback", &self.fallback.platform())
            .finish()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ExtractorRegistry {
    /// An empty registry that sends every URL to `fallback`.
    #[must_use]
    pub fn new(fallback: Arc<dyn PlatformExtractor>) -> Self {
        Self {
            entries: Vec::new(),
            fallback,
        }
    }

    /// Registry with the built-in profile for every known platform and the
    /// generic profile as fallback.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(Arc::new(ProfileExtractor::builtin(Platform::Generic)));
        for platform in Platform::KNOWN.into_iter().rev() {
            registry.register(
                move |host| platform.matches_host(host),
                Arc::new(ProfileExtractor::builtin(platform)),
            );
        }
        registry
    }

    /// Registers `extractor` for hosts accepted by `matches`. Later
    /// registrations take precedence over earlier ones.
    pub fn register<F>(&mut self, matches: F, extractor: Arc<dyn PlatformExtractor>)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.entries.insert(
            0,
            Entry {
                matches: Box::new(matches),
                extractor,
            },
        );
    }

    /// Extractor for a listing URL: first host match, then the URL's
    /// detected platform, then the fallback.
    #[must_use]
    pub fn for_url(&self, url: &str) -> Arc<dyn PlatformExtractor> {
        let host = extract_host(url);
        self.entries
            .iter()
            .find(|e| (e.matches)(&host))
            .map_or_else(
                || self.for_platform(Platform::from_url(url)),
                |e| Arc::clone(&e.extractor),
            )
    }

    /// The registered extractor for `platform`, or the fallback.
    #[must_use]
    pub fn for_platform(&self, platform: Platform) -> Arc<dyn PlatformExtractor> {
        self.entries
            .iter()
            .find(|e| e.extractor.platform() == platform)
            .map_or_else(|| Arc::clone(&self.fallback), |e| Arc::clone(&e.extractor))
    }

    /// `extract(html, platform)`: runs the extractor registered for
    /// `platform` over `html`.
    #[must_use]
    pub fn extract(&self, html: &str, platform: Platform) -> ScrapedProduct {
        self.for_platform(platform).extract(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor;

    impl PlatformExtractor for FixedExtractor {
        fn platform(&self) -> Platform {
            Platform::Generic
        }

        fn extract(&self, _html: &str) -> ScrapedProduct {
            let mut product = ScrapedProduct::placeholder(Platform::Generic);
            product.name = "Registered Extractor Output".to_owned();
            product
        }
    }

    #[test]
    fn defaults_route_by_host() {
        let registry = ExtractorRegistry::with_defaults();
        assert_eq!(
            registry.for_url("https://www.amazon.com/dp/B08N5WRWNW").platform(),
            Platform::Amazon
        );
        assert_eq!(
            registry.for_url("https://www.ebay.co.uk/itm/123456789012").platform(),
            Platform::Ebay
        );
        assert_eq!(
            registry.for_url("https://www.bestbuy.com/site/x/6505727.p").platform(),
            Platform::BestBuy
        );
        assert_eq!(
            registry.for_url("https://example.org/item/42").platform(),
            Platform::Generic
        );
    }

    #[test]
    fn custom_domain_products_path_routes_to_shopify() {
        let registry = ExtractorRegistry::with_defaults();
        assert_eq!(
            registry.for_url("https://trailheadgoods.com/products/canvas-tote").platform(),
            Platform::Shopify
        );
    }

    #[test]
    fn registered_extractor_takes_precedence() {
        let mut registry = ExtractorRegistry::with_defaults();
        registry.register(|host| host == "shop.example.com", Arc::new(FixedExtractor));
        let extractor = registry.for_url("https://shop.example.com/item/9");
        assert_eq!(extractor.extract("").name, "Registered Extractor Output");
    }

    #[test]
    fn extract_by_platform_tags_source() {
        let registry = ExtractorRegistry::with_defaults();
        let product = registry.extract("<title>Etsy</title>", Platform::Etsy);
        assert_eq!(product.source, Platform::Etsy);
        assert_eq!(product.name, "Unknown Product");
    }

    #[test]
    fn every_returned_price_parses_non_negative() {
        use pricelens_core::price::parse_price_value;

        let registry = ExtractorRegistry::with_defaults();
        let pages = [
            "",
            "<span>$-5.00</span>",
            "<meta property=\"product:price:amount\" content=\"NaN\">",
            "<span class=\"product-price\">£1.299,00</span>",
        ];
        for platform in Platform::KNOWN.into_iter().chain([Platform::Generic]) {
            for page in pages {
                let product = registry.extract(page, platform);
                let value = parse_price_value(&product.price).unwrap();
                assert!(value.is_finite() && value >= 0.0, "{platform}: {}", product.price);
            }
        }
    }
}
