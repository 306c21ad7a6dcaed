use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::price::DEFAULT_PRICE;

/// Title used when no extraction rule produced an acceptable product name.
pub const DEFAULT_TITLE: &str = "Unknown Product";
pub const DEFAULT_BRAND: &str = "Unknown Brand";
pub const DEFAULT_SELLER: &str = "Unknown Seller";
pub const DEFAULT_CATEGORY: &str = "General";

/// Page titles that retail sites serve instead of a product name: bot walls,
/// error pages, bare storefront names.
pub const GENERIC_TITLES: &[&str] = &[
    DEFAULT_TITLE,
    "amazon.com",
    "amazon",
    "robot check",
    "sorry! something went wrong!",
    "page not found",
    "access denied",
    "ebay",
    "error page | ebay",
    "etsy",
    "etsy - your place to buy and sell all things handmade",
    "walmart.com",
    "target",
    "best buy",
    "just a moment...",
    "attention required!",
    "404 not found",
    "home",
    "shop",
    "products",
];

/// Returns `true` if `title` is a known non-product page title.
#[must_use]
pub fn is_generic_title(title: &str) -> bool {
    let normalized = title.trim().to_lowercase();
    normalized.is_empty() || GENERIC_TITLES.iter().any(|g| g.eq_ignore_ascii_case(&normalized))
}

/// Stock state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Limited,
    #[default]
    Unknown,
}

impl Availability {
    /// Classifies free-form availability text (DOM text, schema.org URLs,
    /// inline JSON enums) into an [`Availability`].
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase().replace(['_', '-'], " ");
        let compact: String = lower.split_whitespace().collect();

        if compact.contains("outofstock")
            || compact.contains("soldout")
            || compact.contains("unavailable")
            || compact.contains("listinghasended")
            || compact.contains("discontinued")
        {
            return Availability::OutOfStock;
        }
        if compact.contains("limitedavailability")
            || compact.contains("leftinstock")
            || compact.contains("onlyafew")
            || compact.contains("lowstock")
            || (compact.starts_with("only") && compact.contains("left"))
        {
            return Availability::Limited;
        }
        if compact.contains("instock")
            || compact.contains("addtocart")
            || compact.contains("available")
        {
            return Availability::InStock;
        }
        Availability::Unknown
    }
}

/// A product record resolved from a single listing page.
///
/// Created fresh for every resolve call. `confidence` is the extractor's own
/// trust in the record (0.0–1.0), distinct from the validator's 0–100 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedProduct {
    pub name: String,
    pub brand: String,
    /// Currency-prefixed display price, e.g. `"$19.95"`.
    pub price: String,
    pub original_price: Option<String>,
    pub availability: Availability,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub images: Vec<String>,
    pub description: String,
    pub seller: String,
    pub seller_rating: Option<f64>,
    pub category: String,
    pub features: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    pub last_updated: DateTime<Utc>,
    pub source: Platform,
    pub confidence: f64,
}

impl ScrapedProduct {
    /// An all-defaults record for `platform`, the starting point before any
    /// extraction rule has run.
    #[must_use]
    pub fn placeholder(platform: Platform) -> Self {
        Self {
            name: DEFAULT_TITLE.to_owned(),
            brand: DEFAULT_BRAND.to_owned(),
            price: DEFAULT_PRICE.to_owned(),
            original_price: None,
            availability: Availability::Unknown,
            rating: None,
            review_count: None,
            images: Vec::new(),
            description: String::new(),
            seller: DEFAULT_SELLER.to_owned(),
            seller_rating: None,
            category: DEFAULT_CATEGORY.to_owned(),
            features: Vec::new(),
            specifications: BTreeMap::new(),
            last_updated: Utc::now(),
            source: platform,
            confidence: 0.5,
        }
    }

    /// Builds a scraped product from an alternative-source record, tagging it
    /// with the listing's platform and a fixed `confidence`.
    ///
    /// Empty record fields keep the placeholder defaults.
    #[must_use]
    pub fn from_record(record: &ProductRecord, platform: Platform, confidence: f64) -> Self {
        let mut product = Self::placeholder(platform);
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_owned());

        if let Some(name) = non_empty(&record.name) {
            product.name = name;
        }
        if let Some(brand) = non_empty(&record.brand) {
            product.brand = brand;
        }
        if let Some(price) = non_empty(&record.price) {
            product.price = price;
        }
        if let Some(seller) = non_empty(&record.seller) {
            product.seller = seller;
        }
        if let Some(category) = non_empty(&record.category) {
            product.category = category;
        }
        product.original_price = record.original_price.clone();
        product.availability = record.availability;
        product.rating = record.rating;
        product.review_count = record.review_count;
        product.images.clone_from(&record.images);
        product.description.clone_from(&record.description);
        product.features.clone_from(&record.features);
        product.specifications.clone_from(&record.specifications);
        product.confidence = confidence.clamp(0.0, 1.0);
        product
    }
}

/// A normalized product record returned by an alternative data source.
///
/// Fields a source cannot supply are left empty (`""`, `None`, or an empty
/// collection); consumers must treat empty as "unknown", never as a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub brand: String,
    pub price: String,
    pub original_price: Option<String>,
    pub availability: Availability,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub images: Vec<String>,
    pub description: String,
    pub seller: String,
    pub category: String,
    pub features: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    /// Trust in the record, 0.0–1.0.
    pub confidence: f64,
    /// Provenance tag of the source that produced the record,
    /// e.g. `"curated-database"`.
    pub source: String,
}
