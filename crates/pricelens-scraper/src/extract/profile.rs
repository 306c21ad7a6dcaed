//! Per-platform extraction profiles.
//!
//! A profile bundles the ordered rules for every product field with the
//! platform's sanity bounds and confidence markers. Rules are always
//! evaluated most-structured-first: JSON-LD, inline JSON, platform DOM,
//! meta tags, then a generic scan of the raw markup.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use pricelens_core::price::{normalize_price, parse_price_value};
use pricelens_core::products::{DEFAULT_BRAND, DEFAULT_SELLER};
use pricelens_core::{is_generic_title, Availability, Platform, ScrapedProduct};

use super::rules::{FieldRules, Page, Rule};

const MIN_TITLE_LEN: usize = 5;
const MAX_IMAGES: usize = 10;
const MAX_FEATURES: usize = 20;
const BASE_CONFIDENCE: f64 = 0.5;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid regex"));
static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("valid regex"));

/// Inclusive price range a candidate must fall in to be accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self {
            min: 0.01,
            max: 50_000.0,
        }
    }
}

impl PriceBounds {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Markup whose presence raises the extractor's confidence in a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceMarker {
    pub label: &'static str,
    pub needles: Vec<&'static str>,
    pub boost: f64,
}

impl ConfidenceMarker {
    fn present(&self, html: &str) -> bool {
        self.needles.iter().any(|n| html.contains(n))
    }
}

/// Rules for one tier of a profile (inline JSON or platform DOM).
#[derive(Debug, Default)]
pub struct DomRules {
    pub title: Vec<Rule>,
    pub brand: Vec<Rule>,
    pub price: Vec<Rule>,
    pub original_price: Vec<Rule>,
    pub availability: Vec<Rule>,
    pub rating: Vec<Rule>,
    pub review_count: Vec<Rule>,
    pub description: Vec<Rule>,
    pub seller: Vec<Rule>,
    pub seller_rating: Vec<Rule>,
    pub category: Vec<Rule>,
    pub images: Vec<Rule<Vec<String>>>,
    pub features: Vec<Rule<Vec<String>>>,
    pub specifications: Vec<Rule<Vec<(String, String)>>>,
}

#[derive(Debug)]
pub struct ExtractionProfile {
    platform: Platform,
    title: FieldRules,
    brand: FieldRules,
    price: FieldRules,
    original_price: FieldRules,
    availability: FieldRules,
    rating: FieldRules,
    review_count: FieldRules,
    description: FieldRules,
    seller: FieldRules,
    seller_rating: FieldRules,
    category: FieldRules,
    images: FieldRules<Vec<String>>,
    features: FieldRules<Vec<String>>,
    specifications: FieldRules<Vec<(String, String)>>,
    price_bounds: PriceBounds,
    title_affixes: Vec<&'static str>,
    default_seller: Option<&'static str>,
    markers: Vec<ConfidenceMarker>,
}

impl ExtractionProfile {
    /// Profile with only platform DOM rules between the structured and
    /// meta tiers.
    #[must_use]
    pub fn standard(platform: Platform, dom: DomRules) -> Self {
        Self::layered(platform, DomRules::default(), dom)
    }

    /// Profile with an inline-JSON tier evaluated right after JSON-LD and
    /// before the platform DOM rules.
    #[must_use]
    pub fn layered(platform: Platform, inline: DomRules, dom: DomRules) -> Self {
        let DomRules {
            title: inline_title,
            brand: inline_brand,
            price: inline_price,
            original_price: inline_original_price,
            availability: inline_availability,
            rating: inline_rating,
            review_count: inline_review_count,
            description: inline_description,
            seller: inline_seller,
            seller_rating: inline_seller_rating,
            category: inline_category,
            images: inline_images,
            features: inline_features,
            specifications: inline_specifications,
        } = inline;

        let layer = |jsonld: Vec<Rule>, inline: Vec<Rule>, dom: Vec<Rule>, fallback: Vec<Rule>| {
            let mut rules = FieldRules::new(jsonld);
            rules.extend(inline);
            rules.extend(dom);
            rules.extend(fallback);
            rules
        };

        Self {
            platform,
            title: layer(
                vec![jsonld_text("jsonld:name", |p| p.name.clone())],
                inline_title,
                dom.title,
                vec![
                    Rule::meta("meta:og:title", "og:title"),
                    Rule::meta("meta:twitter:title", "twitter:title"),
                    Rule::pattern("generic:h1", r"(?is)<h1\b[^>]*>(.*?)</h1>"),
                    Rule::pattern("generic:title", r"(?is)<title\b[^>]*>(.*?)</title>"),
                ],
            ),
            brand: layer(
                vec![jsonld_text("jsonld:brand", |p| p.brand.clone())],
                inline_brand,
                dom.brand,
                vec![
                    Rule::meta("meta:product:brand", "product:brand"),
                    Rule::itemprop("itemprop:brand", "brand"),
                ],
            ),
            price: layer(
                vec![jsonld_text("jsonld:offers.price", |p| p.price.clone())],
                inline_price,
                dom.price,
                vec![
                    Rule::meta("meta:product:price:amount", "product:price:amount"),
                    Rule::meta("meta:og:price:amount", "og:price:amount"),
                    Rule::itemprop("itemprop:price", "price"),
                    Rule::pattern(
                        "generic:currency-scan",
                        r"((?:CA|US|A)?\$\s?\d[\d,]*(?:\.\d{2})?|[£€]\s?\d[\d,]*(?:[.,]\d{2})?)",
                    ),
                ],
            ),
            original_price: layer(Vec::new(), inline_original_price, dom.original_price, Vec::new()),
            availability: layer(
                vec![jsonld_text("jsonld:offers.availability", |p| {
                    p.availability.clone()
                })],
                inline_availability,
                dom.availability,
                vec![
                    Rule::meta("meta:product:availability", "product:availability"),
                    Rule::meta("meta:og:availability", "og:availability"),
                    Rule::itemprop("itemprop:availability", "availability"),
                    Rule::pattern(
                        "generic:stock-text",
                        r"(?i)\b(in stock|out of stock|sold out|only \d+ left(?: in stock)?|currently unavailable)\b",
                    ),
                ],
            ),
            rating: layer(
                vec![jsonld_text("jsonld:aggregateRating.ratingValue", |p| {
                    p.rating.map(|r| r.to_string())
                })],
                inline_rating,
                dom.rating,
                vec![Rule::itemprop("itemprop:ratingValue", "ratingValue")],
            ),
            review_count: layer(
                vec![jsonld_text("jsonld:aggregateRating.reviewCount", |p| {
                    p.review_count.map(|c| c.to_string())
                })],
                inline_review_count,
                dom.review_count,
                vec![Rule::itemprop("itemprop:reviewCount", "reviewCount")],
            ),
            description: layer(
                vec![jsonld_text("jsonld:description", |p| p.description.clone())],
                inline_description,
                dom.description,
                vec![
                    Rule::meta("meta:og:description", "og:description"),
                    Rule::meta("meta:description", "description"),
                ],
            ),
            seller: layer(
                vec![jsonld_text("jsonld:offers.seller", |p| p.seller.clone())],
                inline_seller,
                dom.seller,
                Vec::new(),
            ),
            seller_rating: layer(Vec::new(), inline_seller_rating, dom.seller_rating, Vec::new()),
            category: layer(
                vec![jsonld_text("jsonld:category", |p| p.category.clone())],
                inline_category,
                dom.category,
                vec![Rule::meta("meta:product:category", "product:category")],
            ),
            images: {
                let mut rules = FieldRules::new(vec![Rule::new("jsonld:image", |page| {
                    page.json_ld
                        .as_ref()
                        .map(|p| p.images.clone())
                        .filter(|v| !v.is_empty())
                })]);
                rules.extend(inline_images);
                rules.extend(dom.images);
                rules.push(Rule::meta_list("meta:og:image", "og:image"));
                rules
            },
            features: {
                let mut rules = FieldRules::new(inline_features);
                rules.extend(dom.features);
                rules
            },
            specifications: {
                let mut rules = FieldRules::new(vec![Rule::new("jsonld:additionalProperty", |page| {
                    page.json_ld
                        .as_ref()
                        .map(|p| p.properties.clone().into_iter().collect::<Vec<_>>())
                        .filter(|v| !v.is_empty())
                })]);
                rules.extend(inline_specifications);
                rules.extend(dom.specifications);
                rules
            },
            price_bounds: PriceBounds::default(),
            title_affixes: Vec::new(),
            default_seller: None,
            markers: vec![
                ConfidenceMarker {
                    label: "structured-data",
                    needles: vec!["application/ld+json"],
                    boost: 0.2,
                },
                ConfidenceMarker {
                    label: "price-markup",
                    needles: vec!["itemprop=\"price\"", "product:price:amount"],
                    boost: 0.15,
                },
                ConfidenceMarker {
                    label: "review-markup",
                    needles: vec!["aggregateRating", "itemprop=\"reviewCount\""],
                    boost: 0.1,
                },
                ConfidenceMarker {
                    label: "availability-markup",
                    needles: vec!["itemprop=\"availability\"", "schema.org/InStock"],
                    boost: 0.1,
                },
            ],
        }
    }

    #[must_use]
    pub fn with_price_bounds(mut self, min: f64, max: f64) -> Self {
        self.price_bounds = PriceBounds { min, max };
        self
    }

    /// Storefront prefixes/suffixes stripped from extracted titles, such as
    /// `"Amazon.com: "` or `" | eBay"`.
    #[must_use]
    pub fn with_title_affixes(mut self, affixes: &[&'static str]) -> Self {
        self.title_affixes.extend_from_slice(affixes);
        self
    }

    /// Seller used when the page names none, e.g. first-party retailers.
    #[must_use]
    pub fn with_default_seller(mut self, seller: &'static str) -> Self {
        self.default_seller = Some(seller);
        self
    }

    /// Adds platform needles to a marker. An unknown `label` registers a new
    /// marker with `boost`; a known one keeps its original boost.
    #[must_use]
    pub fn with_marker(mut self, label: &'static str, needles: &[&'static str], boost: f64) -> Self {
        if let Some(existing) = self.markers.iter_mut().find(|m| m.label == label) {
            existing.needles.extend_from_slice(needles);
        } else {
            self.markers.push(ConfidenceMarker {
                label,
                needles: needles.to_vec(),
                boost,
            });
        }
        self
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub fn price_bounds(&self) -> PriceBounds {
        self.price_bounds
    }

    /// Rule names for the title field, in evaluation order.
    pub fn title_rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.title.names()
    }

    /// Rule names for the price field, in evaluation order.
    pub fn price_rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.price.names()
    }

    /// Runs every field's rules over `html`. Fields with no accepted value
    /// keep the [`ScrapedProduct::placeholder`] defaults.
    #[must_use]
    pub fn extract(&self, html: &str) -> ScrapedProduct {
        let page = Page::new(html);
        let mut product = ScrapedProduct::placeholder(self.platform);

        if let Some(name) = self.pick("title", &self.title, &page, |raw| self.accept_title(&raw)) {
            product.name = name;
        }
        if let Some(brand) = self.pick("brand", &self.brand, &page, |raw| accept_brand(&raw)) {
            product.brand = brand;
        }
        if let Some(price) = self.pick("price", &self.price, &page, |raw| {
            self.accept_price(&raw, page.currency_symbol)
        }) {
            product.price = price;
        }
        product.original_price = self.pick("originalPrice", &self.original_price, &page, |raw| {
            self.accept_price(&raw, page.currency_symbol)
        });
        if let Some(availability) = self.pick("availability", &self.availability, &page, |raw| {
            Some(Availability::from_text(&raw)).filter(|a| *a != Availability::Unknown)
        }) {
            product.availability = availability;
        }
        product.rating = self.pick("rating", &self.rating, &page, |raw| accept_rating(&raw));
        product.review_count =
            self.pick("reviewCount", &self.review_count, &page, |raw| accept_count(&raw));
        if let Some(description) =
            self.pick("description", &self.description, &page, |raw| accept_plain(raw, 5000))
        {
            product.description = description;
        }
        match self.pick("seller", &self.seller, &page, |raw| accept_seller(&raw)) {
            Some(seller) => product.seller = seller,
            None => {
                if let Some(default) = self.default_seller {
                    product.seller = default.to_owned();
                }
            }
        }
        product.seller_rating =
            self.pick("sellerRating", &self.seller_rating, &page, |raw| accept_seller_rating(&raw));
        if let Some(category) =
            self.pick("category", &self.category, &page, |raw| accept_plain(raw, 200))
        {
            product.category = category;
        }
        if let Some(images) = self.pick("images", &self.images, &page, accept_images) {
            product.images = images;
        }
        if let Some(features) = self.pick("features", &self.features, &page, accept_features) {
            product.features = features;
        }
        if let Some(specs) =
            self.pick("specifications", &self.specifications, &page, accept_specifications)
        {
            product.specifications = specs;
        }

        product.confidence = self.confidence(html);
        product
    }

    fn pick<T, U>(
        &self,
        field: &'static str,
        rules: &FieldRules<T>,
        page: &Page<'_>,
        accept: impl Fn(T) -> Option<U>,
    ) -> Option<U> {
        match rules.first_accepted(page, accept) {
            Some((value, rule)) => {
                tracing::debug!(platform = %self.platform, field, rule, "extraction rule matched");
                Some(value)
            }
            None => {
                tracing::debug!(platform = %self.platform, field, "no extraction rule matched, using default");
                None
            }
        }
    }

    /// Structural-marker confidence: base 0.5 plus each present marker's
    /// boost, capped at 1.0.
    #[must_use]
    pub fn confidence(&self, html: &str) -> f64 {
        let boost: f64 = self
            .markers
            .iter()
            .filter(|m| m.present(html))
            .map(|m| m.boost)
            .sum();
        (BASE_CONFIDENCE + boost).min(1.0)
    }

    fn accept_title(&self, raw: &str) -> Option<String> {
        let mut title = raw.trim().to_owned();
        for affix in &self.title_affixes {
            if let Some(rest) = title.strip_prefix(affix) {
                title = rest.trim().to_owned();
            }
            if let Some(rest) = title.strip_suffix(affix) {
                title = rest.trim().to_owned();
            }
        }
        (title.chars().count() >= MIN_TITLE_LEN && !is_generic_title(&title)).then_some(title)
    }

    fn accept_price(&self, raw: &str, fallback_symbol: &str) -> Option<String> {
        let value = parse_price_value(raw)?;
        if !self.price_bounds.contains(value) {
            return None;
        }
        normalize_price(raw, fallback_symbol)
    }
}

/// Wraps a JSON-LD field accessor as a rule.
fn jsonld_text(
    name: &'static str,
    field: fn(&super::jsonld::JsonLdProduct) -> Option<String>,
) -> Rule {
    Rule::new(name, move |page| page.json_ld.as_ref().and_then(field))
}

fn accept_plain(raw: String, max_len: usize) -> Option<String> {
    let text = raw.trim();
    (!text.is_empty() && text.chars().count() <= max_len).then(|| text.to_owned())
}

fn accept_brand(raw: &str) -> Option<String> {
    let mut brand = raw.trim();
    for prefix in ["Visit the ", "Brand: ", "Brand:"] {
        if let Some(rest) = brand.strip_prefix(prefix) {
            brand = rest.trim();
        }
    }
    if let Some(rest) = brand.strip_suffix(" Store") {
        brand = rest.trim();
    }
    let len = brand.chars().count();
    ((1..=100).contains(&len) && brand != DEFAULT_BRAND).then(|| brand.to_owned())
}

fn accept_seller(raw: &str) -> Option<String> {
    let seller = raw.trim();
    let len = seller.chars().count();
    ((2..=100).contains(&len) && seller != DEFAULT_SELLER).then(|| seller.to_owned())
}

fn first_number(raw: &str) -> Option<f64> {
    NUMBER_RE
        .find(raw)
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn accept_rating(raw: &str) -> Option<f64> {
    first_number(raw).filter(|r| (0.0..=5.0).contains(r))
}

/// Seller feedback is published either as a 0–5 score or a 0–100 percentage.
fn accept_seller_rating(raw: &str) -> Option<f64> {
    first_number(raw).filter(|r| (0.0..=100.0).contains(r))
}

fn accept_count(raw: &str) -> Option<u64> {
    COUNT_RE
        .find(raw)
        .and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok())
}

fn accept_images(raw: Vec<String>) -> Option<Vec<String>> {
    let mut seen = HashSet::new();
    let images: Vec<String> = raw
        .into_iter()
        .map(|url| url.trim().to_owned())
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
        .filter(|url| seen.insert(url.clone()))
        .take(MAX_IMAGES)
        .collect();
    (!images.is_empty()).then_some(images)
}

fn accept_features(raw: Vec<String>) -> Option<Vec<String>> {
    let mut seen = HashSet::new();
    let features: Vec<String> = raw
        .into_iter()
        .map(|f| f.trim().to_owned())
        .filter(|f| f.chars().count() >= 3)
        .filter(|f| seen.insert(f.clone()))
        .take(MAX_FEATURES)
        .collect();
    (!features.is_empty()).then_some(features)
}

fn accept_specifications(raw: Vec<(String, String)>) -> Option<BTreeMap<String, String>> {
    let specs: BTreeMap<String, String> = raw
        .into_iter()
        .map(|(k, v)| (k.trim().trim_end_matches(':').trim().to_owned(), v.trim().to_owned()))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty() && k.chars().count() <= 80)
        .collect();
    (!specs.is_empty()).then_some(specs)
}
