//! schema.org `Product` extraction from `<script type="application/ld+json">`
//! blocks.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::html::decode_entities;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

const PRODUCT_TYPES: &[&str] = &["Product", "ProductGroup", "IndividualProduct"];

/// The subset of a schema.org `Product` node the extraction rules read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonLdProduct {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub images: Vec<String>,
    /// Raw price as written in the offer, without a currency symbol.
    pub price: Option<String>,
    /// ISO 4217 code from `priceCurrency`.
    pub currency: Option<String>,
    pub availability: Option<String>,
    pub seller: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub sku: Option<String>,
    pub properties: BTreeMap<String, String>,
}

/// Returns the first `Product` node found in the page's JSON-LD blocks.
///
/// Top-level objects, arrays, and `@graph` containers are all searched.
/// Blocks that fail to parse are skipped.
#[must_use]
pub fn extract_product(html: &str) -> Option<JsonLdProduct> {
    for cap in SCRIPT_RE.captures_iter(html) {
        let Some(body) = cap.get(1) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(body.as_str().trim()) else {
            continue;
        };

        let mut candidates: Vec<&Value> = match &value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        let graph: Vec<&Value> = candidates
            .iter()
            .copied()
            .filter_map(|item| item.get("@graph").and_then(Value::as_array))
            .flatten()
            .collect();
        candidates.extend(graph);

        if let Some(product) = candidates.into_iter().find_map(product_from_node) {
            return Some(product);
        }
    }
    None
}

/// Returns `true` if the page carries any JSON-LD block at all.
#[must_use]
pub fn has_structured_data(html: &str) -> bool {
    SCRIPT_RE.is_match(html)
}

fn product_from_node(node: &Value) -> Option<JsonLdProduct> {
    if !type_matches(node.get("@type")?) {
        return None;
    }

    let offer = first_offer(node.get("offers"));
    let price = offer.and_then(|o| {
        o.get("price")
            .or_else(|| o.get("lowPrice"))
            .and_then(scalar_string)
    });
    let currency = offer
        .and_then(|o| o.get("priceCurrency"))
        .and_then(scalar_string);
    let availability = offer
        .and_then(|o| o.get("availability"))
        .and_then(scalar_string);
    let seller = offer
        .and_then(|o| o.get("seller"))
        .and_then(named_string);

    let aggregate = node.get("aggregateRating");
    let rating = aggregate
        .and_then(|a| a.get("ratingValue"))
        .and_then(number);
    let review_count = aggregate
        .and_then(|a| a.get("reviewCount").or_else(|| a.get("ratingCount")))
        .and_then(count);

    let properties = node
        .get("additionalProperty")
        .and_then(Value::as_array)
        .map(|props| {
            props
                .iter()
                .filter_map(|p| {
                    let name = p.get("name").and_then(scalar_string)?;
                    let value = p.get("value").and_then(scalar_string)?;
                    Some((name, value))
                })
                .collect()
        })
        .unwrap_or_default();

    Some(JsonLdProduct {
        name: node.get("name").and_then(scalar_string),
        brand: node.get("brand").and_then(named_string),
        description: node.get("description").and_then(scalar_string),
        category: node.get("category").and_then(scalar_string),
        images: node.get("image").map(image_urls).unwrap_or_default(),
        price,
        currency,
        availability,
        seller,
        rating,
        review_count,
        sku: node.get("sku").and_then(scalar_string),
        properties,
    })
}

/// `@type` may be a plain string or an array of strings.
fn type_matches(type_node: &Value) -> bool {
    let is_product = |s: &str| PRODUCT_TYPES.iter().any(|t| s.eq_ignore_ascii_case(t));
    match type_node {
        Value::String(s) => is_product(s),
        Value::Array(items) => items.iter().filter_map(Value::as_str).any(is_product),
        _ => false,
    }
}

/// `offers` may be a single `Offer`, an `AggregateOffer`, or an array.
fn first_offer(offers: Option<&Value>) -> Option<&Value> {
    match offers? {
        Value::Array(items) => items.first(),
        obj @ Value::Object(_) => Some(obj),
        _ => None,
    }
}

/// Strings pass through; numbers are rendered. Empty strings are dropped.
fn scalar_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => decode_entities(s.trim()),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Reads either a bare string or the `name` of a nested object
/// (`"brand": {"@type": "Brand", "name": "Acme"}`).
fn named_string(value: &Value) -> Option<String> {
    scalar_string(value).or_else(|| value.get("name").and_then(scalar_string))
}

/// Numbers in the wild arrive as JSON numbers or numeric strings.
fn number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        number(value)
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n as u64)
    })
}

fn image_urls(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .or_else(|| item.get("url").and_then(scalar_string))
            })
            .collect(),
        Value::Object(_) => value
            .get("url")
            .and_then(scalar_string)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}
