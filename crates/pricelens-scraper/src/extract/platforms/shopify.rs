use std::sync::LazyLock;

use regex::Regex;

use pricelens_core::Platform;

use crate::extract::html::find_meta_content;
use crate::extract::profile::{DomRules, ExtractionProfile};
use crate::extract::rules::Rule;

/// `ShopifyAnalytics.meta` carries variant prices as integer cents.
static ANALYTICS_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)var meta = \{"product":.*?"variants":\[\{.*?"price":(\d+)"#)
        .expect("valid regex")
});

fn analytics_price(html: &str) -> Option<String> {
    let cents: u64 = ANALYTICS_PRICE_RE.captures(html)?.get(1)?.as_str().parse().ok()?;
    Some(format!("{}.{:02}", cents / 100, cents % 100))
}

pub(super) fn profile() -> ExtractionProfile {
    let inline = DomRules {
        price: vec![Rule::new("shopify:analytics-meta", |page| {
            analytics_price(page.html)
        })],
        brand: vec![Rule::pattern(
            "shopify:analytics-vendor",
            r#"(?s)var meta = \{"product":\{.*?"vendor":"([^"]+)""#,
        )],
        ..DomRules::default()
    };
    let dom = DomRules {
        title: vec![Rule::pattern(
            "shopify:product__title",
            r#"(?is)<div[^>]+class="product__title"[^>]*>\s*<h1[^>]*>(.*?)</h1>"#,
        )],
        price: vec![Rule::pattern(
            "shopify:price-item",
            r#"(?is)<span[^>]+class="price-item price-item--(?:sale|regular)[^"]*"[^>]*>(.*?)</span>"#,
        )],
        original_price: vec![Rule::pattern(
            "shopify:compare-at",
            r#"(?is)<s[^>]+class="price-item price-item--regular"[^>]*>(.*?)</s>"#,
        )],
        availability: vec![Rule::pattern(
            "shopify:add-button",
            r#"(?is)<button[^>]+name="add"[^>]*>\s*<span>(.*?)</span>"#,
        )],
        brand: vec![Rule::pattern(
            "shopify:product__vendor",
            r#"(?is)<p[^>]+class="product__text[^"]*"[^>]*>(.*?)</p>"#,
        )],
        seller: vec![Rule::new("shopify:og:site_name", |page| {
            find_meta_content(page.html, "og:site_name")
        })],
        images: vec![Rule::pattern_all(
            "shopify:cdn-images",
            r#"(?is)<img[^>]+src="((?:https:)?//[^"]*cdn\.shopify\.com/[^"]+)""#,
        )],
        ..DomRules::default()
    };

    ExtractionProfile::layered(Platform::Shopify, inline, dom)
        .with_marker("price-markup", &["price-item", "ShopifyAnalytics"], 0.15)
        .with_marker("availability-markup", &["name=\"add\""], 0.1)
}

#[cfg(test)]
mod tests {
    use pricelens_core::Availability;

    use super::*;

    #[test]
    fn analytics_price_is_converted_from_cents() {
        let html = r#"<script>var meta = {"product":{"id":1,"vendor":"Trailhead","variants":[{"id":2,"price":2450,"name":"Canvas Tote"}]}};</script>"#;
        assert_eq!(analytics_price(html).as_deref(), Some("24.50"));
        let product = profile().extract(html);
        assert_eq!(product.price, "$24.50");
        assert_eq!(product.brand, "Trailhead");
    }

    #[test]
    fn storefront_markup() {
        let html = r#"
            <meta property="og:site_name" content="Trailhead Goods">
            <meta property="og:title" content="Waxed Canvas Tote Bag">
            <div class="product__title"><h1>Waxed Canvas Tote Bag</h1></div>
            <span class="price-item price-item--sale price-item--last">$38.00 USD</span>
            <button type="submit" name="add" class="product-form__submit"><span>Add to cart</span></button>
        "#;
        let product = profile().extract(html);
        assert_eq!(product.name, "Waxed Canvas Tote Bag");
        assert_eq!(product.price, "$38.00");
        assert_eq!(product.seller, "Trailhead Goods");
        assert_eq!(product.availability, Availability::InStock);
    }
}
