use pricelens_core::Platform;

use crate::extract::profile::{DomRules, ExtractionProfile};
use crate::extract::rules::Rule;

pub(super) fn profile() -> ExtractionProfile {
    let dom = DomRules {
        title: vec![Rule::pattern(
            "etsy:buy-box-title",
            r#"(?is)<h1[^>]+data-buy-box-listing-title[^>]*>(.*?)</h1>"#,
        )],
        price: vec![Rule::pattern(
            "etsy:buy-box-price",
            r#"(?is)<div[^>]+data-buy-box-region="price"[^>]*>.*?<p[^>]+class="[^"]*wt-text-title-larger[^"]*"[^>]*>(.*?)</p>"#,
        )],
        original_price: vec![Rule::pattern(
            "etsy:original-price",
            r#"(?is)Original Price:?\s*</span>\s*([^<]+)"#,
        )],
        availability: vec![Rule::pattern(
            "etsy:sold-out",
            r"(?i)(Sorry, this item is sold out|Sold out)",
        )],
        review_count: vec![Rule::pattern(
            "etsy:shop-reviews",
            r"(?i)\(([\d,]+)\)\s*</span>\s*reviews",
        )],
        seller: vec![
            Rule::pattern("etsy:data-shop-name", r#"(?is)data-shop-name="([^"]+)""#),
            Rule::pattern("etsy:shop_name-json", r#""shop_name"\s*:\s*"([^"]+)""#),
        ],
        images: vec![Rule::pattern_all(
            "etsy:etsystatic",
            r#"(?is)<img[^>]+(?:data-)?src(?:-zoom)?="(https://i\.etsystatic\.com/[^"]+)""#,
        )],
        features: vec![Rule::list_in_block(
            "etsy:item-details",
            r#"(?is)<div[^>]+data-product-details-highlights[^>]*>(.*?)</ul>"#,
            r"(?is)<li[^>]*>(.*?)</li>",
        )],
        ..DomRules::default()
    };

    ExtractionProfile::standard(Platform::Etsy, dom)
        .with_title_affixes(&[" - Etsy", " | Etsy"])
        .with_marker("price-markup", &["data-buy-box-region=\"price\""], 0.15)
        .with_marker("review-markup", &["data-reviews"], 0.1)
}

#[cfg(test)]
mod tests {
    use pricelens_core::Availability;

    use super::*;

    #[test]
    fn extracts_buy_box_fields() {
        let html = r#"
            <h1 class="wt-text-body-01" data-buy-box-listing-title="true">
                Personalized Leather Keychain - Custom Engraved Gift
            </h1>
            <div data-buy-box-region="price">
              <p class="wt-text-title-larger wt-mr-xs-1">
                <span class="wt-screen-reader-only">Price:</span>$19.95
              </p>
              <span class="wt-screen-reader-only">Original Price:</span> $24.95
            </div>
            <a href="/shop/LeatherCraftStudio" data-shop-name="LeatherCraftStudio">LeatherCraftStudio</a>
            <img data-src-zoom="https://i.etsystatic.com/1/r/il/a.jpg">
        "#;
        let product = profile().extract(html);
        assert_eq!(product.name, "Personalized Leather Keychain - Custom Engraved Gift");
        assert_eq!(product.price, "$19.95");
        assert_eq!(product.original_price.as_deref(), Some("$24.95"));
        assert_eq!(product.seller, "LeatherCraftStudio");
        assert_eq!(product.images.len(), 1);
    }

    #[test]
    fn sold_out_listing() {
        let html = "<p>Sorry, this item is sold out</p>";
        assert_eq!(profile().extract(html).availability, Availability::OutOfStock);
    }

    #[test]
    fn shop_name_from_inline_json() {
        let html = r#"<script>{"shop_name":"NorthwoodsCandles"}</script>"#;
        assert_eq!(profile().extract(html).seller, "NorthwoodsCandles");
    }
}
