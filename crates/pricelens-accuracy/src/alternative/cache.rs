use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use pricelens_core::{ProductRecord, ScrapedProduct};

/// Provenance tag for records served from the cache.
pub const SOURCE_RECORD_CACHE: &str = "record-cache";

/// Default number of listings kept before the oldest is evicted.
pub const DEFAULT_RECORD_CACHE_CAPACITY: usize = 1000;

#[derive(Debug, Default)]
struct Entries {
    records: HashMap<String, ProductRecord>,
    /// Insertion order, oldest first. Holds exactly the keys of `records`.
    order: VecDeque<String>,
}

/// URL → record store of previously resolved, high-confidence listings.
///
/// Bounded: once `capacity` listings are stored, each new URL evicts the
/// least recently inserted one. A capacity of zero disables caching.
#[derive(Debug)]
pub struct RecordCache {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RECORD_CACHE_CAPACITY)
    }
}

impl RecordCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            capacity,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<ProductRecord> {
        self.lock().records.get(url).cloned()
    }

    /// Stores `record` under `url`. Re-inserting a URL replaces its record
    /// and makes it the newest entry.
    pub fn insert(&self, url: &str, record: ProductRecord) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        if entries.records.insert(url.to_owned(), record).is_some() {
            entries.order.retain(|key| key != url);
        }
        entries.order.push_back(url.to_owned());
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.records.remove(&oldest);
                tracing::debug!(url = %oldest, "record cache evicted oldest listing");
            }
        }
    }

    /// Stores the normalized form of a resolved product.
    pub fn remember(&self, url: &str, product: &ScrapedProduct) {
        self.insert(url, record_from_product(product));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.records.clear();
        entries.order.clear();
    }
}

fn record_from_product(product: &ScrapedProduct) -> ProductRecord {
    ProductRecord {
        name: product.name.clone(),
        brand: product.brand.clone(),
        price: product.price.clone(),
        original_price: product.original_price.clone(),
        availability: product.availability,
        rating: product.rating,
        review_count: product.review_count,
        images: product.images.clone(),
        description: product.description.clone(),
        seller: product.seller.clone(),
        category: product.category.clone(),
        features: product.features.clone(),
        specifications: product.specifications.clone(),
        confidence: product.confidence,
        source: SOURCE_RECORD_CACHE.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pricelens_core::Platform;

    use super::*;

    #[test]
    fn remember_then_get() {
        let cache = RecordCache::new();
        let mut product = ScrapedProduct::placeholder(Platform::Etsy);
        product.name = "Beeswax Taper Candles".to_owned();
        product.price = "$18.00".to_owned();
        cache.remember("https://www.etsy.com/listing/7", &product);

        let record = cache.get("https://www.etsy.com/listing/7").unwrap();
        assert_eq!(record.name, "Beeswax Taper Candles");
        assert_eq!(record.source, SOURCE_RECORD_CACHE);
        assert!(cache.get("https://www.etsy.com/listing/8").is_none());
    }

    fn record(price: &str) -> ProductRecord {
        ProductRecord {
            price: price.to_owned(),
            ..ProductRecord::default()
        }
    }

    #[test]
    fn evicts_oldest_listing_past_capacity() {
        let cache = RecordCache::with_capacity(2);
        cache.insert("a", record("$1.00"));
        cache.insert("b", record("$2.00"));
        cache.insert("c", record("$3.00"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("c").map(|r| r.price).as_deref(), Some("$3.00"));
    }

    #[test]
    fn reinsert_refreshes_without_growing() {
        let cache = RecordCache::with_capacity(2);
        cache.insert("a", record("$1.00"));
        cache.insert("b", record("$2.00"));
        cache.insert("a", record("$1.50"));
        cache.insert("c", record("$3.00"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").map(|r| r.price).as_deref(), Some("$1.50"));
    }

    #[test]
    fn many_distinct_urls_stay_bounded() {
        let cache = RecordCache::new();
        for n in 0..DEFAULT_RECORD_CACHE_CAPACITY + 250 {
            cache.insert(&format!("https://www.etsy.com/listing/{n}"), ProductRecord::default());
        }
        assert_eq!(cache.len(), DEFAULT_RECORD_CACHE_CAPACITY);
        assert!(cache.get("https://www.etsy.com/listing/0").is_none());
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = RecordCache::with_capacity(0);
        cache.insert("a", ProductRecord::default());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = RecordCache::new();
        cache.insert("u", ProductRecord::default());
        cache.clear();
        assert!(cache.is_empty());
    }
}
