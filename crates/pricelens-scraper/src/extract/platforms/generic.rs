use pricelens_core::Platform;

use crate::extract::html::find_meta_content;
use crate::extract::profile::{DomRules, ExtractionProfile};
use crate::extract::rules::Rule;

/// Fallback for unrecognized storefronts: structured data, meta tags, and
/// a few conventions common to most templates.
pub(super) fn profile() -> ExtractionProfile {
    let dom = DomRules {
        price: vec![Rule::pattern(
            "generic:price-class",
            r#"(?is)<[a-z]+[^>]+class="[^"]*\b(?:product-price|price--main|current-price|sale-price)\b[^"]*"[^>]*>(.*?)</[a-z]+>"#,
        )],
        seller: vec![Rule::new("generic:og:site_name", |page| {
            find_meta_content(page.html, "og:site_name")
        })],
        specifications: vec![Rule::pairs(
            "generic:spec-table",
            r"(?is)<tr[^>]*>\s*<t[hd][^>]*>(.*?)</t[hd]>\s*<td[^>]*>(.*?)</td>\s*</tr>",
        )],
        ..DomRules::default()
    };
    ExtractionProfile::standard(Platform::Generic, dom)
}
