use pricelens_core::Platform;

use crate::extract::profile::{DomRules, ExtractionProfile};
use crate::extract::rules::Rule;

pub(super) fn profile() -> ExtractionProfile {
    let inline = DomRules {
        price: vec![Rule::pattern(
            "bestbuy:currentPrice",
            r#""currentPrice"\s*:\s*([\d.]+)"#,
        )],
        original_price: vec![Rule::pattern(
            "bestbuy:regularPrice",
            r#""regularPrice"\s*:\s*([\d.]+)"#,
        )],
        ..DomRules::default()
    };
    let dom = DomRules {
        title: vec![Rule::pattern(
            "bestbuy:sku-title",
            r#"(?is)<div[^>]+class="sku-title"[^>]*>.*?<h1[^>]*>(.*?)</h1>"#,
        )],
        price: vec![Rule::pattern(
            "bestbuy:priceView-hero-price",
            r#"(?is)<div[^>]+class="priceView-hero-price priceView-customer-price"[^>]*>\s*<span[^>]*>(.*?)</span>"#,
        )],
        availability: vec![Rule::pattern(
            "bestbuy:button-state",
            r#"(?is)<button[^>]+data-button-state="([A-Z_]+)""#,
        )],
        rating: vec![Rule::pattern(
            "bestbuy:customer-rating",
            r#"(?is)<span class="ugc-c-review-average[^"]*"[^>]*>(.*?)</span>"#,
        )],
        review_count: vec![Rule::pattern(
            "bestbuy:c-reviews",
            r#"(?is)<span class="c-reviews[^"]*"[^>]*>(.*?)</span>"#,
        )],
        specifications: vec![Rule::pairs(
            "bestbuy:spec-rows",
            r#"(?is)<div class="row-title"[^>]*>(.*?)</div>\s*<div class="row-value[^"]*"[^>]*>(.*?)</div>"#,
        )],
        features: vec![Rule::pattern_all(
            "bestbuy:feature-title",
            r#"(?is)<h4 class="feature-title"[^>]*>(.*?)</h4>"#,
        )],
        ..DomRules::default()
    };

    ExtractionProfile::layered(Platform::BestBuy, inline, dom)
        .with_price_bounds(0.01, 100_000.0)
        .with_title_affixes(&[" - Best Buy"])
        .with_default_seller("Best Buy")
        .with_marker("price-markup", &["priceView-hero-price"], 0.15)
        .with_marker("review-markup", &["ugc-c-review-average"], 0.1)
        .with_marker("availability-markup", &["data-button-state"], 0.1)
}
