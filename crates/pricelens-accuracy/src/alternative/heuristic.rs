//! URL-only fallbacks: keyword category matching and the terminal
//! best-guess record.

use pricelens_core::products::DEFAULT_CATEGORY;
use pricelens_core::{extract_path, Platform, ProductRecord};

use super::product_id::ProductId;

pub const SOURCE_KEYWORD_HEURISTIC: &str = "keyword-heuristic";
pub const SOURCE_URL_PATTERN: &str = "url-pattern";

const KEYWORD_CONFIDENCE: f64 = 0.5;
const GUESS_CONFIDENCE: f64 = 0.3;

/// Category hints matched against URL slug words.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Electronics",
        &["headphones", "earbuds", "airpods", "laptop", "phone", "tablet", "camera", "speaker", "charger", "tv", "monitor"],
    ),
    (
        "Home & Kitchen",
        &["mug", "tumbler", "blender", "skillet", "pan", "knife", "lamp", "candle", "candles", "pillow", "towel", "kitchen"],
    ),
    (
        "Clothing",
        &["shirt", "tshirt", "dress", "jacket", "hoodie", "sweater", "shoes", "sneakers", "socks", "hat"],
    ),
    (
        "Accessories",
        &["keychain", "wallet", "bracelet", "necklace", "earrings", "ring", "bag", "tote", "watch"],
    ),
    ("Toys & Games", &["toy", "toys", "lego", "puzzle", "game", "plush"]),
    ("Books", &["book", "books", "novel", "paperback", "hardcover"]),
    ("Beauty", &["serum", "moisturizer", "lipstick", "shampoo", "perfume"]),
];

/// Product-name slug words extracted from the URL path, e.g.
/// `/listing/123/walnut-serving-board` → `["walnut", "serving", "board"]`.
///
/// The longest hyphenated path segment is taken as the slug; pure IDs and
/// platform path words are ignored.
fn slug_words(url: &str) -> Vec<String> {
    let path = extract_path(url);
    path.split('/')
        .filter(|seg| seg.contains('-') && seg.chars().any(char::is_alphabetic))
        .filter(|seg| !seg.starts_with("A-"))
        .max_by_key(|seg| seg.len())
        .map(|seg| {
            seg.trim_end_matches(".html")
                .split(['-', '_', '+'])
                .filter(|w| !w.is_empty() && !w.chars().all(|c| c.is_ascii_digit()))
                .map(str::to_lowercase)
                .collect()
        })
        .unwrap_or_default()
}

fn title_case(words: &[String]) -> String {
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Matches slug words against category hints.
///
/// Succeeds only when a category keyword is present. Price and seller are
/// left empty; a URL says nothing reliable about either.
#[must_use]
pub fn keyword_match(url: &str) -> Option<ProductRecord> {
    let words = slug_words(url);
    let category = CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| words.iter().any(|w| keywords.contains(&w.as_str())))
        .map(|(category, _)| *category)?;
    Some(ProductRecord {
        name: title_case(&words),
        category: category.to_owned(),
        confidence: KEYWORD_CONFIDENCE,
        source: SOURCE_KEYWORD_HEURISTIC.to_owned(),
        ..ProductRecord::default()
    })
}

/// Terminal best guess. Always produces a record: a name from the URL slug
/// (or the platform and product ID), nothing else.
#[must_use]
pub fn url_pattern_guess(url: &str) -> ProductRecord {
    let words = slug_words(url);
    let name = if words.len() >= 2 {
        title_case(&words)
    } else {
        let platform = Platform::from_url(url);
        match ProductId::from_url(url) {
            Some(id) => format!("{} item {}", title_case(&[platform.to_string()]), id.value),
            None => String::new(),
        }
    };
    ProductRecord {
        name,
        category: DEFAULT_CATEGORY.to_owned(),
        confidence: GUESS_CONFIDENCE,
        source: SOURCE_URL_PATTERN.to_owned(),
        ..ProductRecord::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_longest_hyphenated_segment() {
        assert_eq!(
            slug_words("https://www.etsy.com/listing/123/walnut-serving-board?ref=x"),
            vec!["walnut", "serving", "board"]
        );
        assert_eq!(
            slug_words("https://www.amazon.com/Stanley-Quencher-Tumbler-40oz/dp/B0CJZMP7L1"),
            vec!["stanley", "quencher", "tumbler", "40oz"]
        );
        assert!(slug_words("https://www.ebay.com/itm/256012345678").is_empty());
    }

    #[test]
    fn keyword_match_sets_category_and_name() {
        let record = keyword_match("https://www.etsy.com/listing/1/engraved-leather-wallet").unwrap();
        assert_eq!(record.category, "Accessories");
        assert_eq!(record.name, "Engraved Leather Wallet");
        assert!(record.price.is_empty());
        assert_eq!(record.source, SOURCE_KEYWORD_HEURISTIC);
    }

    #[test]
    fn keyword_match_needs_a_hint() {
        assert!(keyword_match("https://www.etsy.com/listing/1/mystery-object").is_none());
    }

    #[test]
    fn url_guess_always_succeeds() {
        let from_slug = url_pattern_guess("https://shop.example.com/products/waxed-canvas-tote");
        assert_eq!(from_slug.name, "Waxed Canvas Tote");
        assert_eq!(from_slug.source, SOURCE_URL_PATTERN);

        let from_id = url_pattern_guess("https://www.ebay.com/itm/256012345678");
        assert_eq!(from_id.name, "Ebay item 256012345678");

        let nothing = url_pattern_guess("https://example.org/");
        assert!(nothing.name.is_empty());
        assert!(nothing.price.is_empty());
        assert!(nothing.confidence < KEYWORD_CONFIDENCE);
    }
}
