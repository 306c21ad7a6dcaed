use pricelens_core::Platform;

use crate::extract::profile::{DomRules, ExtractionProfile};
use crate::extract::rules::Rule;

pub(super) fn profile() -> ExtractionProfile {
    let dom = DomRules {
        title: vec![Rule::pattern(
            "ebay:x-item-title",
            r#"(?is)<h1[^>]+class="x-item-title__mainTitle"[^>]*>(.*?)</h1>"#,
        )],
        price: vec![Rule::pattern(
            "ebay:x-price-primary",
            r#"(?is)<div[^>]+class="x-price-primary"[^>]*>(.*?)</div>"#,
        )],
        original_price: vec![Rule::pattern(
            "ebay:x-additional-info",
            r#"(?is)<span[^>]+class="ux-textspans ux-textspans--STRIKETHROUGH"[^>]*>(.*?)</span>"#,
        )],
        availability: vec![
            Rule::pattern(
                "ebay:quantity-available",
                r#"(?is)<div[^>]+class="x-quantity__availability"[^>]*>(.*?)</div>"#,
            ),
            Rule::pattern(
                "ebay:ended-banner",
                r"(?i)(This listing has ended|This listing was ended)",
            ),
        ],
        rating: vec![Rule::pattern(
            "ebay:review-stars",
            r#"(?is)<span[^>]+class="ux-summary__start--rating"[^>]*>(.*?)</span>"#,
        )],
        review_count: vec![Rule::pattern(
            "ebay:product-ratings",
            r"(?i)([\d,]+)\s+product ratings",
        )],
        seller: vec![Rule::pattern(
            "ebay:seller-card",
            r#"(?is)<div[^>]+class="x-sellercard-atf__info__about-seller"[^>]*>.*?<span[^>]*>(.*?)</span>"#,
        )],
        seller_rating: vec![Rule::pattern(
            "ebay:positive-feedback",
            r"(?i)([\d.]+)%\s+positive",
        )],
        images: vec![Rule::pattern_all(
            "ebay:image-carousel",
            r#"(?is)<img[^>]+src="(https://i\.ebayimg\.com/[^"]+)""#,
        )],
        specifications: vec![Rule::pairs(
            "ebay:item-specifics",
            r#"(?is)<div class="ux-labels-values__labels"[^>]*>(.*?)</div>\s*<div class="ux-labels-values__values"[^>]*>(.*?)</div>"#,
        )],
        ..DomRules::default()
    };

    ExtractionProfile::standard(Platform::Ebay, dom)
        .with_title_affixes(&[" | eBay"])
        .with_marker("price-markup", &["x-price-primary"], 0.15)
        .with_marker("review-markup", &["product ratings", "ux-summary__start--rating"], 0.1)
        .with_marker("availability-markup", &["x-quantity__availability"], 0.1)
}
