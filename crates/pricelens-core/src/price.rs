//! Currency-prefixed price strings.
//!
//! Prices travel through the pipeline as display strings such as `"$19.95"`
//! or `"CA$1,299.00"`. These helpers convert between that representation and
//! numeric values without losing the currency marker.

/// Placeholder price used when no extraction rule produced a usable value.
pub const DEFAULT_PRICE: &str = "$0.00";

const CURRENCY_SYMBOLS: &[&str] = &["CA$", "US$", "A$", "$", "€", "£", "¥", "₹"];

/// Parses the numeric portion of a price string.
///
/// Handles thousands separators (`"$1,299.99"`), comma decimals
/// (`"19,99 €"`), and surrounding text. Returns `None` when no digits are
/// present or the result is not finite.
#[must_use]
pub fn parse_price_value(raw: &str) -> Option<f64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let number: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let number = number.trim_end_matches([',', '.']);

    let normalized = match (number.rfind(','), number.rfind('.')) {
        // "1.299,99": dot thousands, comma decimal.
        (Some(comma), Some(dot)) if comma > dot => number.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => number.replace(',', ""),
        (Some(comma), None) => {
            let decimals = number.len() - comma - 1;
            if decimals == 2 && number.matches(',').count() == 1 {
                number.replace(',', ".")
            } else {
                number.replace(',', "")
            }
        }
        _ => number.to_owned(),
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Returns `true` if the price string carries a recognized currency symbol.
#[must_use]
pub fn has_currency_symbol(raw: &str) -> bool {
    CURRENCY_SYMBOLS.iter().any(|s| raw.contains(s))
}

/// Returns the leading currency symbol of a price string, if any.
#[must_use]
pub fn currency_symbol(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim_start();
    CURRENCY_SYMBOLS
        .iter()
        .copied()
        .find(|s| trimmed.starts_with(s))
        .or_else(|| CURRENCY_SYMBOLS.iter().copied().find(|s| raw.contains(s)))
}

/// Maps an ISO 4217 code to the display symbol used in price strings.
///
/// Unknown codes fall back to `$`.
#[must_use]
pub fn symbol_for_code(code: &str) -> &'static str {
    match code.trim().to_ascii_uppercase().as_str() {
        "EUR" => "€",
        "GBP" => "£",
        "CAD" => "CA$",
        "AUD" => "A$",
        "JPY" => "¥",
        "INR" => "₹",
        _ => "$",
    }
}

/// Formats a numeric amount as a currency-prefixed price with two decimals.
#[must_use]
pub fn format_price(value: f64, symbol: &str) -> String {
    format!("{symbol}{value:.2}")
}

/// Re-renders a raw price string in canonical `<symbol><amount>` form.
///
/// `fallback_symbol` is used when the raw text has no symbol of its own.
#[must_use]
pub fn normalize_price(raw: &str, fallback_symbol: &str) -> Option<String> {
    let value = parse_price_value(raw)?;
    let symbol = currency_symbol(raw).unwrap_or(fallback_symbol);
    Some(format_price(value, symbol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dollar_amount() {
        assert_eq!(parse_price_value("$19.95"), Some(19.95));
    }

    #[test]
    fn parses_thousands_separator() {
        assert_eq!(parse_price_value("$1,299.99"), Some(1299.99));
    }

    #[test]
    fn parses_comma_decimal() {
        assert_eq!(parse_price_value("19,99 €"), Some(19.99));
        assert_eq!(parse_price_value("1.299,50 €"), Some(1299.5));
    }

    #[test]
    fn parses_thousands_comma_without_decimals() {
        assert_eq!(parse_price_value("$1,299"), Some(1299.0));
    }

    #[test]
    fn parses_amount_embedded_in_text() {
        assert_eq!(parse_price_value("Now only US $42.50!"), Some(42.5));
    }

    #[test]
    fn no_digits_returns_none() {
        assert_eq!(parse_price_value("See price in cart"), None);
        assert_eq!(parse_price_value(""), None);
    }

    #[test]
    fn default_price_parses_to_zero() {
        assert_eq!(parse_price_value(DEFAULT_PRICE), Some(0.0));
    }

    #[test]
    fn detects_currency_symbols() {
        assert!(has_currency_symbol("$5.00"));
        assert!(has_currency_symbol("£5.00"));
        assert!(!has_currency_symbol("5.00"));
    }

    #[test]
    fn currency_symbol_prefers_longest_prefix() {
        assert_eq!(currency_symbol("CA$12.00"), Some("CA$"));
        assert_eq!(currency_symbol("$12.00"), Some("$"));
        assert_eq!(currency_symbol("12.00"), None);
    }

    #[test]
    fn normalize_keeps_symbol_and_pads_decimals() {
        assert_eq!(normalize_price("£7", "$").as_deref(), Some("£7.00"));
        assert_eq!(normalize_price("24.5", "€").as_deref(), Some("€24.50"));
        assert_eq!(normalize_price("free", "$"), None);
    }

    #[test]
    fn symbol_for_code_falls_back_to_dollar() {
        assert_eq!(symbol_for_code("gbp"), "£");
        assert_eq!(symbol_for_code("XYZ"), "$");
    }
}
