use pricelens_core::Platform;

use crate::extract::profile::{DomRules, ExtractionProfile};
use crate::extract::rules::Rule;

pub(super) fn profile() -> ExtractionProfile {
    let inline = DomRules {
        price: vec![Rule::pattern(
            "target:current_retail",
            r#""current_retail"\s*:\s*([\d.]+)"#,
        )],
        original_price: vec![Rule::pattern(
            "target:reg_retail",
            r#""reg_retail"\s*:\s*([\d.]+)"#,
        )],
        ..DomRules::default()
    };
    let dom = DomRules {
        title: vec![Rule::pattern(
            "target:product-title",
            r#"(?is)<h1[^>]+data-test="product-title"[^>]*>(.*?)</h1>"#,
        )],
        price: vec![Rule::pattern(
            "target:product-price",
            r#"(?is)<span[^>]+data-test="product-price"[^>]*>(.*?)</span>"#,
        )],
        availability: vec![
            Rule::new("target:shipItButton", |page| {
                page.html
                    .contains("data-test=\"shippingButton\"")
                    .then(|| "In stock".to_owned())
            }),
            Rule::new("target:addToCartButton", |page| {
                page.html
                    .contains("data-test=\"addToCartButton\"")
                    .then(|| "Add to cart".to_owned())
            }),
            Rule::new("target:outOfStockButton", |page| {
                page.html
                    .contains("data-test=\"outOfStockButton\"")
                    .then(|| "Out of stock".to_owned())
            }),
        ],
        rating: vec![Rule::pattern(
            "target:rating-value",
            r#"(?is)<span[^>]+data-test="rating-value"[^>]*>(.*?)</span>"#,
        )],
        review_count: vec![Rule::pattern(
            "target:rating-count",
            r#"(?is)<span[^>]+data-test="rating-count"[^>]*>(.*?)</span>"#,
        )],
        features: vec![Rule::list_in_block(
            "target:highlights",
            r#"(?is)<div[^>]+data-test="item-highlights"[^>]*>(.*?)</ul>"#,
            r"(?is)<li[^>]*>(.*?)</li>",
        )],
        specifications: vec![Rule::pairs(
            "target:item-details-specifications",
            r#"(?is)<div[^>]+data-test="item-details-specifications"[^>]*>\s*<b>(.*?)</b>\s*([^<]+)"#,
        )],
        ..DomRules::default()
    };

    ExtractionProfile::layered(Platform::Target, inline, dom)
        .with_title_affixes(&[" : Target"])
        .with_default_seller("Target")
        .with_marker("price-markup", &["data-test=\"product-price\"", "\"current_retail\""], 0.15)
        .with_marker("review-markup", &["data-test=\"rating-count\""], 0.1)
        .with_marker("availability-markup", &["addToCartButton", "outOfStockButton"], 0.1)
}
