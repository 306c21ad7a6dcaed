use pricelens_core::Platform;

use crate::extract::profile::{DomRules, ExtractionProfile};
use crate::extract::rules::Rule;

pub(super) fn profile() -> ExtractionProfile {
    let dom = DomRules {
        title: vec![Rule::pattern(
            "amazon:productTitle",
            r#"(?is)<span[^>]+id="productTitle"[^>]*>(.*?)</span>"#,
        )],
        brand: vec![Rule::pattern(
            "amazon:bylineInfo",
            r#"(?is)<a[^>]+id="bylineInfo"[^>]*>(.*?)</a>"#,
        )],
        price: vec![
            Rule::pattern(
                "amazon:corePrice",
                r#"(?is)id="corePrice(?:Display_desktop)?_feature_div".*?<span class="a-offscreen">(.*?)</span>"#,
            ),
            Rule::pattern(
                "amazon:priceblock",
                r#"(?is)<span[^>]+id="priceblock_(?:ourprice|dealprice|saleprice)"[^>]*>(.*?)</span>"#,
            ),
            Rule::pattern(
                "amazon:a-offscreen",
                r#"(?is)<span class="a-price[^"]*"[^>]*>\s*<span class="a-offscreen">(.*?)</span>"#,
            ),
        ],
        original_price: vec![Rule::pattern(
            "amazon:basisPrice",
            r#"(?is)<span class="a-price a-text-price"[^>]*data-a-strike="true"[^>]*>\s*<span class="a-offscreen">(.*?)</span>"#,
        )],
        availability: vec![Rule::pattern(
            "amazon:availability",
            r#"(?is)<div[^>]+id="availability"[^>]*>(.*?)</div>"#,
        )],
        rating: vec![Rule::pattern(
            "amazon:acrPopover",
            r#"(?is)id="acrPopover"[^>]*title="([^"]+)""#,
        )],
        review_count: vec![Rule::pattern(
            "amazon:acrCustomerReviewText",
            r#"(?is)<span[^>]+id="acrCustomerReviewText"[^>]*>(.*?)</span>"#,
        )],
        description: vec![Rule::pattern(
            "amazon:productDescription",
            r#"(?is)<div[^>]+id="productDescription"[^>]*>(.*?)</div>"#,
        )],
        seller: vec![Rule::pattern(
            "amazon:sellerProfileTriggerId",
            r#"(?is)<a[^>]+id="sellerProfileTriggerId"[^>]*>(.*?)</a>"#,
        )],
        category: vec![Rule::pattern(
            "amazon:breadcrumb",
            r#"(?is)<div[^>]+id="wayfinding-breadcrumbs_feature_div".*?<a[^>]*>(.*?)</a>"#,
        )],
        images: vec![Rule::pattern_all(
            "amazon:hiRes",
            r#""hiRes"\s*:\s*"(https://[^"]+)""#,
        )],
        features: vec![Rule::list_in_block(
            "amazon:feature-bullets",
            r#"(?is)<div[^>]+id="feature-bullets"[^>]*>(.*?)</div>"#,
            r#"(?is)<span class="a-list-item"[^>]*>(.*?)</span>"#,
        )],
        specifications: vec![Rule::pairs_in_block(
            "amazon:techSpec",
            r#"(?is)<table[^>]+id="productDetails_techSpec_section_1"[^>]*>(.*?)</table>"#,
            r"(?is)<th[^>]*>(.*?)</th>\s*<td[^>]*>(.*?)</td>",
        )],
        ..DomRules::default()
    };

    ExtractionProfile::standard(Platform::Amazon, dom)
        .with_title_affixes(&["Amazon.com: ", " : Amazon.com", "Amazon.com : "])
        .with_default_seller("Amazon.com")
        .with_marker("price-markup", &["a-price-whole", "corePrice_feature_div", "priceblock_"], 0.15)
        .with_marker("review-markup", &["acrCustomerReviewText"], 0.1)
        .with_marker("availability-markup", &["id=\"availability\""], 0.1)
}

#[cfg(test)]
mod tests {
    use pricelens_core::Availability;

    use super::*;

    const PAGE: &str = r#"
        <html><head><title>Amazon.com: Stanley Quencher Tumbler 40 oz</title></head>
        <body>
          <span id="productTitle" class="a-size-large">   Stanley Quencher H2.0 Tumbler, 40 oz   </span>
          <a id="bylineInfo" href="/stores/Stanley">Visit the STANLEY Store</a>
          <div id="corePrice_feature_div"><span class="a-price"><span class="a-offscreen">$45.00</span></span></div>
          <span id="acrPopover" title="4.7 out of 5 stars"></span>
          <span id="acrCustomerReviewText">38,512 ratings</span>
          <div id="availability"><span>In Stock</span></div>
          <a id="sellerProfileTriggerId" href="/sp">Stanley Official</a>
          <div id="feature-bullets"><ul>
            <li><span class="a-list-item">Double-wall vacuum insulation</span></li>
            <li><span class="a-list-item">Dishwasher safe</span></li>
          </ul></div>
          <table id="productDetails_techSpec_section_1">
            <tr><th> Capacity </th><td> 40 Fluid Ounces </td></tr>
            <tr><th>Material</th><td>Stainless Steel</td></tr>
          </table>
          <script>var data = {"hiRes":"https://m.media-amazon.com/images/I/a.jpg"};</script>
        </body></html>
    "#;

    #[test]
    fn extracts_dom_fields() {
        let product = profile().extract(PAGE);
        assert_eq!(product.name, "Stanley Quencher H2.0 Tumbler, 40 oz");
        assert_eq!(product.brand, "STANLEY");
        assert_eq!(product.price, "$45.00");
        assert_eq!(product.rating, Some(4.7));
        assert_eq!(product.review_count, Some(38_512));
        assert_eq!(product.availability, Availability::InStock);
        assert_eq!(product.seller, "Stanley Official");
        assert_eq!(product.features.len(), 2);
        assert_eq!(
            product.specifications.get("Capacity").map(String::as_str),
            Some("40 Fluid Ounces")
        );
        assert_eq!(product.images, vec!["https://m.media-amazon.com/images/I/a.jpg"]);
    }

    #[test]
    fn confidence_counts_amazon_markup() {
        let product = profile().extract(PAGE);
        // price + review + availability markers, no JSON-LD block.
        assert!((product.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_title_tag_without_storefront_prefix() {
        let product = profile().extract("<title>Amazon.com: Bamboo Cutting Board Set</title>");
        assert_eq!(product.name, "Bamboo Cutting Board Set");
        assert_eq!(product.seller, "Amazon.com");
    }

    #[test]
    fn robot_check_page_keeps_defaults() {
        let product = profile().extract("<title>Robot Check</title><h1>Robot Check</h1>");
        assert_eq!(product.name, "Unknown Product");
        assert_eq!(product.price, "$0.00");
    }
}
