//! Field-level and cross-field consistency checks.

use pricelens_core::price::{has_currency_symbol, parse_price_value};
use pricelens_core::products::DEFAULT_SELLER;
use pricelens_core::{
    is_generic_title, Platform, ProductField, ScrapedProduct, Severity, ValidationIssue,
    ValidationResult,
};

const MIN_PRICE: f64 = 0.01;
const MAX_PRICE: f64 = 50_000.0;
const MAX_PRICE_BESTBUY: f64 = 100_000.0;
const MAX_PRICE_ETSY: f64 = 10_000.0;
const MIN_TITLE_LEN: usize = 10;
const MIN_TITLE_LEN_ETSY: usize = 20;

pub const SUGGEST_RESCRAPE: &str = "Re-scrape the listing: high-severity issues usually mean extraction failed";
pub const SUGGEST_VERIFY_PRICE: &str = "Verify the price manually against the listing page";
pub const SUGGEST_CHECK_TITLE: &str = "Check the product title against the listing page";
pub const SUGGEST_CONFIRM_SELLER: &str = "Confirm the seller or shop name";
pub const SUGGEST_CHECK_PLATFORM: &str = "Confirm the listing URL belongs to the expected platform";
pub const SUGGEST_ADD_DETAILS: &str = "Fill in missing images, ratings, or specifications from the listing";

/// Scores a [`ScrapedProduct`] by severity-weighted issue penalties.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs every check and returns the scored result. Never fails.
    #[must_use]
    pub fn validate(&self, product: &ScrapedProduct, url: &str) -> ValidationResult {
        let mut issues = Vec::new();
        check_price(product, &mut issues);
        check_title(product, &mut issues);
        check_rating(product, &mut issues);
        check_platform_consistency(product, url, &mut issues);
        check_platform_norms(product, &mut issues);

        let suggestions = suggestions_for(&issues);
        let result = ValidationResult::from_issues(issues, suggestions);
        tracing::debug!(
            url,
            confidence = result.confidence,
            issues = result.issues.len(),
            "validated product"
        );
        result
    }
}

fn check_price(product: &ScrapedProduct, issues: &mut Vec<ValidationIssue>) {
    let price = product.price.as_str();
    let value = match parse_price_value(price) {
        Some(v) if v > 0.0 => v,
        _ => {
            issues.push(
                ValidationIssue::new(
                    ProductField::Price,
                    Severity::High,
                    "Price is zero or could not be parsed",
                    price,
                )
                .expecting("currency symbol followed by an amount above zero"),
            );
            return;
        }
    };

    if !has_currency_symbol(price) {
        issues.push(
            ValidationIssue::new(
                ProductField::Price,
                Severity::Medium,
                "Price is missing a currency symbol",
                price,
            )
            .expecting("$, €, £ or another currency prefix"),
        );
    }

    if value < MIN_PRICE {
        issues.push(ValidationIssue::new(
            ProductField::Price,
            Severity::High,
            "Price is below the smallest plausible amount",
            price,
        ));
    }

    let max = if product.source == Platform::BestBuy {
        MAX_PRICE_BESTBUY
    } else {
        MAX_PRICE
    };
    if product.source == Platform::Etsy && value > MAX_PRICE_ETSY {
        issues.push(ValidationIssue::new(
            ProductField::Price,
            Severity::Medium,
            "Price is unusually high for an Etsy listing",
            price,
        ));
    } else if value > max {
        issues.push(ValidationIssue::new(
            ProductField::Price,
            Severity::Medium,
            "Price exceeds the plausible maximum",
            price,
        ));
    }

    if let Some(original) = product.original_price.as_deref() {
        if parse_price_value(original).is_some_and(|o| o < value) {
            issues.push(ValidationIssue::new(
                ProductField::OriginalPrice,
                Severity::Low,
                "Original price is lower than the current price",
                original,
            ));
        }
    }
}

fn check_title(product: &ScrapedProduct, issues: &mut Vec<ValidationIssue>) {
    let title = product.name.trim();
    if is_generic_title(title) {
        issues.push(
            ValidationIssue::new(
                ProductField::Title,
                Severity::High,
                "Title is a generic fallback, not a product name",
                title,
            )
            .expecting("the listing's product name"),
        );
        return;
    }

    let len = title.chars().count();
    if len < MIN_TITLE_LEN {
        issues.push(ValidationIssue::new(
            ProductField::Title,
            Severity::Medium,
            "Title is too short",
            title,
        ));
    } else if product.source == Platform::Etsy && len < MIN_TITLE_LEN_ETSY {
        issues.push(ValidationIssue::new(
            ProductField::Title,
            Severity::Low,
            "Etsy titles are usually more descriptive",
            title,
        ));
    }
}

fn check_rating(product: &ScrapedProduct, issues: &mut Vec<ValidationIssue>) {
    let Some(rating) = product.rating else {
        return;
    };
    if !(0.0..=5.0).contains(&rating) {
        issues.push(
            ValidationIssue::new(
                ProductField::Rating,
                Severity::Medium,
                "Rating is outside the 0-5 scale",
                rating.to_string(),
            )
            .expecting("0.0 to 5.0"),
        );
    }
    if product.review_count.unwrap_or(0) == 0 {
        issues.push(ValidationIssue::new(
            ProductField::ReviewCount,
            Severity::Low,
            "Rating present without any reviews",
            product
                .review_count
                .map_or_else(|| "none".to_owned(), |c| c.to_string()),
        ));
    }
}

fn check_platform_consistency(
    product: &ScrapedProduct,
    url: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if product.source != Platform::Generic {
        let seller = product.seller.to_lowercase();
        let foreign = Platform::KNOWN
            .into_iter()
            .filter(|p| *p != product.source)
            .find(|p| p.keywords().iter().any(|k| seller.contains(k)));
        if let Some(other) = foreign {
            issues.push(ValidationIssue::new(
                ProductField::Seller,
                Severity::High,
                format!(
                    "Seller references {other} but the listing source is {}",
                    product.source
                ),
                product.seller.as_str(),
            ));
        }
    }

    let url_platform = Platform::from_url(url);
    if url_platform != product.source {
        issues.push(
            ValidationIssue::new(
                ProductField::Source,
                Severity::Medium,
                "Listing source does not match the URL's platform",
                product.source.as_str(),
            )
            .expecting(url_platform.as_str()),
        );
    }
}

fn check_platform_norms(product: &ScrapedProduct, issues: &mut Vec<ValidationIssue>) {
    let platform = product.source;

    let seller = product.seller.trim();
    if seller.is_empty() || seller == DEFAULT_SELLER {
        let severity = match platform {
            Platform::Etsy | Platform::Ebay | Platform::Shopify => Severity::Medium,
            _ => Severity::Low,
        };
        issues.push(ValidationIssue::new(
            ProductField::Seller,
            severity,
            "No seller or shop name found",
            seller,
        ));
    }

    if product.images.is_empty() {
        let severity = match platform {
            Platform::Shopify | Platform::Generic => Severity::Low,
            _ => Severity::Medium,
        };
        issues.push(ValidationIssue::new(
            ProductField::Images,
            severity,
            "No product images found",
            "0 images",
        ));
    }

    if product.specifications.is_empty() && matches!(platform, Platform::Amazon | Platform::BestBuy)
    {
        issues.push(ValidationIssue::new(
            ProductField::Specifications,
            Severity::Low,
            "No specifications found",
            "0 entries",
        ));
    }
}

/// Suggestions in a fixed order, one per issue category present.
fn suggestions_for(issues: &[ValidationIssue]) -> Vec<String> {
    let has_field = |fields: &[ProductField]| issues.iter().any(|i| fields.contains(&i.field));
    let mut suggestions = Vec::new();

    if issues.iter().any(|i| i.severity == Severity::High) {
        suggestions.push(SUGGEST_RESCRAPE);
    }
    if has_field(&[ProductField::Price, ProductField::OriginalPrice]) {
        suggestions.push(SUGGEST_VERIFY_PRICE);
    }
    if has_field(&[ProductField::Title]) {
        suggestions.push(SUGGEST_CHECK_TITLE);
    }
    if has_field(&[ProductField::Seller]) {
        suggestions.push(SUGGEST_CONFIRM_SELLER);
    }
    if has_field(&[ProductField::Source]) {
        suggestions.push(SUGGEST_CHECK_PLATFORM);
    }
    if has_field(&[
        ProductField::Images,
        ProductField::Rating,
        ProductField::ReviewCount,
        ProductField::Specifications,
    ]) {
        suggestions.push(SUGGEST_ADD_DETAILS);
    }

    suggestions.into_iter().map(str::to_owned).collect()
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
