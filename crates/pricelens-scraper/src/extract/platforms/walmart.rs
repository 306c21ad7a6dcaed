use pricelens_core::Platform;

use crate::extract::profile::{DomRules, ExtractionProfile};
use crate::extract::rules::Rule;

/// Walmart pages ship the product state as inline JSON (`__NEXT_DATA__`);
/// the DOM tier only covers what the inline state sometimes omits.
pub(super) fn profile() -> ExtractionProfile {
    let inline = DomRules {
        price: vec![Rule::pattern(
            "walmart:currentPrice",
            r#""currentPrice"\s*:\s*\{[^{}]*?"price"\s*:\s*([\d.]+)"#,
        )],
        original_price: vec![Rule::pattern(
            "walmart:wasPrice",
            r#""wasPrice"\s*:\s*\{[^{}]*?"price"\s*:\s*([\d.]+)"#,
        )],
        availability: vec![Rule::pattern(
            "walmart:availabilityStatus",
            r#""availabilityStatus"\s*:\s*"([A-Z_]+)""#,
        )],
        rating: vec![Rule::pattern(
            "walmart:averageRating",
            r#""averageRating"\s*:\s*([\d.]+)"#,
        )],
        review_count: vec![Rule::pattern(
            "walmart:numberOfReviews",
            r#""numberOfReviews"\s*:\s*(\d+)"#,
        )],
        seller: vec![Rule::pattern(
            "walmart:sellerDisplayName",
            r#""sellerDisplayName"\s*:\s*"([^"]+)""#,
        )],
        brand: vec![Rule::pattern("walmart:brand-json", r#""brand"\s*:\s*"([^"]+)""#)],
        ..DomRules::default()
    };
    let dom = DomRules {
        title: vec![Rule::pattern(
            "walmart:main-title",
            r#"(?is)<h1[^>]+itemprop="name"[^>]*>(.*?)</h1>"#,
        )],
        price: vec![Rule::pattern(
            "walmart:price-wrap",
            r#"(?is)<span[^>]+itemprop="price"[^>]*>(.*?)</span>"#,
        )],
        images: vec![Rule::pattern_all(
            "walmart:i5-walmartimages",
            r#"(?is)<img[^>]+src="(https://i5\.walmartimages\.com/[^"?]+)"#,
        )],
        ..DomRules::default()
    };

    ExtractionProfile::layered(Platform::Walmart, inline, dom)
        .with_title_affixes(&[" - Walmart.com", " | Walmart.com"])
        .with_default_seller("Walmart.com")
        .with_marker("structured-data", &["__NEXT_DATA__"], 0.2)
        .with_marker("price-markup", &["\"currentPrice\""], 0.15)
        .with_marker("review-markup", &["\"numberOfReviews\""], 0.1)
        .with_marker("availability-markup", &["\"availabilityStatus\""], 0.1)
}
