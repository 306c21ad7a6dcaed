use serde::{Deserialize, Serialize};
use url::Url;

/// Retail platform a listing URL belongs to.
///
/// Serialized as the lowercase platform tag (`"amazon"`, `"bestbuy"`, ...),
/// which is also the `source` tag carried by a [`crate::ScrapedProduct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Amazon,
    Ebay,
    Etsy,
    Walmart,
    Target,
    BestBuy,
    Shopify,
    Generic,
}

impl Platform {
    /// Every platform with a dedicated extractor, in registry order.
    pub const KNOWN: [Platform; 7] = [
        Platform::Amazon,
        Platform::Ebay,
        Platform::Etsy,
        Platform::Walmart,
        Platform::Target,
        Platform::BestBuy,
        Platform::Shopify,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Amazon => "amazon",
            Platform::Ebay => "ebay",
            Platform::Etsy => "etsy",
            Platform::Walmart => "walmart",
            Platform::Target => "target",
            Platform::BestBuy => "bestbuy",
            Platform::Shopify => "shopify",
            Platform::Generic => "generic",
        }
    }

    /// Words that identify the platform when they show up in free text such
    /// as a seller name.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Platform::Amazon => &["amazon"],
            Platform::Ebay => &["ebay"],
            Platform::Etsy => &["etsy"],
            Platform::Walmart => &["walmart"],
            Platform::Target => &["target.com"],
            Platform::BestBuy => &["best buy", "bestbuy"],
            Platform::Shopify => &["shopify"],
            Platform::Generic => &[],
        }
    }

    /// Returns `true` when `host` belongs to this platform.
    ///
    /// Matching is by registrable-domain suffix so that country storefronts
    /// (`amazon.co.uk`, `ebay.de`) and subdomains (`www.`, `m.`) resolve to the
    /// same platform.
    #[must_use]
    pub fn matches_host(self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        let labels: Vec<&str> = host.split('.').collect();
        let has_label = |name: &str| labels.iter().any(|l| *l == name);
        match self {
            Platform::Amazon => has_label("amazon") || host.ends_with("amzn.to"),
            Platform::Ebay => has_label("ebay"),
            Platform::Etsy => has_label("etsy"),
            Platform::Walmart => has_label("walmart"),
            Platform::Target => host == "target.com" || host.ends_with(".target.com"),
            Platform::BestBuy => has_label("bestbuy"),
            Platform::Shopify => host.ends_with(".myshopify.com"),
            Platform::Generic => false,
        }
    }

    /// Detects the platform for a listing URL.
    ///
    /// Storefronts on custom domains are recognized as Shopify when the path
    /// follows Shopify's `/products/{handle}` convention.
    #[must_use]
    pub fn from_url(url: &str) -> Platform {
        let host = extract_host(url);
        if let Some(platform) = Platform::KNOWN
            .into_iter()
            .find(|p| p.matches_host(&host))
        {
            return platform;
        }
        if extract_path(url).starts_with("/products/") {
            return Platform::Shopify;
        }
        Platform::Generic
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `url`, retrying with an `https://` prefix for scheme-less input
/// such as `"etsy.com/listing/1"`. Only URLs with a host are accepted.
fn parse_lenient(url: &str) -> Option<Url> {
    let trimmed = url.trim();
    Url::parse(trimmed)
        .ok()
        .filter(Url::has_host)
        .or_else(|| Url::parse(&format!("https://{trimmed}")).ok().filter(Url::has_host))
}

/// Extracts the lowercase hostname from a URL, without port or `www.` prefix.
/// IPv6 hosts keep their brackets (`"[2001:db8::1]"`).
///
/// Falls back to the lowercased input itself when it cannot be parsed.
#[must_use]
pub fn extract_host(url: &str) -> String {
    let host = parse_lenient(url)
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_else(|| url.trim().to_ascii_lowercase());
    match host.strip_prefix("www.") {
        Some(bare) => bare.to_owned(),
        None => host,
    }
}

/// Extracts the path component of a URL (always starting with `/`), in the
/// percent-encoded form `Url::path` normalizes it to.
#[must_use]
pub fn extract_path(url: &str) -> String {
    parse_lenient(url).map_or_else(|| "/".to_owned(), |u| u.path().to_owned())
}
