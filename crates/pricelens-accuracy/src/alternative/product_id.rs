//! Platform-specific product identifiers embedded in listing URLs.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use pricelens_core::Platform;

static AMAZON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:dp|gp/product)/([A-Z0-9]{10})(?:[/?#]|$)").expect("valid regex")
});
static EBAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/itm/(?:[^/?#]+/)?(\d{12})(?:[/?#]|$)").expect("valid regex"));
static ETSY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/listing/(\d+)(?:[/?#]|$)").expect("valid regex"));
static WALMART_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/ip/(?:[^/?#]+/)?(\d+)(?:[/?#]|$)").expect("valid regex"));
static TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/A-(\d+)(?:[/?#]|$)").expect("valid regex"));
static BESTBUY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[?&]skuId=(\d+)|/(\d{7})\.p(?:[/?#]|$))").expect("valid regex")
});

/// A platform-scoped product identifier (ASIN, eBay item number, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId {
    pub platform: Platform,
    pub value: String,
}

impl ProductId {
    #[must_use]
    pub fn new(platform: Platform, value: impl Into<String>) -> Self {
        Self {
            platform,
            value: value.into(),
        }
    }

    /// Extracts the identifier from a listing URL using the pattern of the
    /// URL's platform. Returns `None` for platforms without an ID scheme or
    /// URLs that do not follow it.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let platform = Platform::from_url(url);
        let re: &Regex = match platform {
            Platform::Amazon => &AMAZON_RE,
            Platform::Ebay => &EBAY_RE,
            Platform::Etsy => &ETSY_RE,
            Platform::Walmart => &WALMART_RE,
            Platform::Target => &TARGET_RE,
            Platform::BestBuy => &BESTBUY_RE,
            Platform::Shopify | Platform::Generic => return None,
        };
        let caps = re.captures(url)?;
        let value = caps.iter().skip(1).flatten().next()?.as_str();
        Some(Self::new(platform, value))
    }

    /// The caller-supplied `known_id` when present, otherwise the ID parsed
    /// from `url`.
    #[must_use]
    pub fn resolve(url: &str, known_id: Option<&str>) -> Option<Self> {
        match known_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Some(Self::new(Platform::from_url(url), id)),
            None => Self::from_url(url),
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.value)
    }
}
