//! Ordered, independently testable extraction rules.
//!
//! A [`Rule`] is a pure function from a [`Page`] to an optional raw value.
//! [`FieldRules`] holds the ordered list for one field; the first rule whose
//! output passes the field's acceptance check wins.

use regex::Regex;

use pricelens_core::price::symbol_for_code;

use super::html::{clean_text, find_itemprop, find_meta_content};
use super::jsonld::{self, JsonLdProduct};

/// Parsed view of a listing page shared by every rule.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub html: &'a str,
    pub json_ld: Option<JsonLdProduct>,
    /// Display symbol for prices written without one, from `priceCurrency`
    /// or the `product:price:currency` meta tag. Defaults to `$`.
    pub currency_symbol: &'static str,
}

impl<'a> Page<'a> {
    #[must_use]
    pub fn new(html: &'a str) -> Self {
        let json_ld = jsonld::extract_product(html);
        let currency_symbol = json_ld
            .as_ref()
            .and_then(|p| p.currency.clone())
            .or_else(|| find_meta_content(html, "product:price:currency"))
            .or_else(|| find_meta_content(html, "og:price:currency"))
            .or_else(|| find_itemprop(html, "priceCurrency"))
            .map_or("$", |code| symbol_for_code(&code));
        Self {
            html,
            json_ld,
            currency_symbol,
        }
    }
}

type Extract<T> = Box<dyn Fn(&Page<'_>) -> Option<T> + Send + Sync>;

/// A named extraction step producing a raw, not yet validated, value.
pub struct Rule<T = String> {
    name: &'static str,
    apply: Extract<T>,
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

impl<T> Rule<T> {
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(&Page<'_>) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            name,
            apply: Box::new(apply),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn apply(&self, page: &Page<'_>) -> Option<T> {
        (self.apply)(page)
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

impl Rule<String> {
    /// Capture group 1 of the first match, with markup stripped.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Patterns are literals
    /// supplied by the platform profiles.
    #[must_use]
    pub fn pattern(name: &'static str, pattern: &str) -> Self {
        let re = compile(pattern);
        Self::new(name, move |page| {
            re.captures_iter(page.html)
                .filter_map(|c| c.get(1))
                .map(|m| clean_text(m.as_str()))
                .find(|s| !s.is_empty())
        })
    }

    /// The `content` of a `<meta>` tag keyed by `property` or `name`.
    #[must_use]
    pub fn meta(name: &'static str, key: &'static str) -> Self {
        Self::new(name, move |page| {
            find_meta_content(page.html, key).and_then(|v| non_empty(clean_text(&v)))
        })
    }

    /// A schema.org microdata value.
    #[must_use]
    pub fn itemprop(name: &'static str, prop: &'static str) -> Self {
        Self::new(name, move |page| {
            find_itemprop(page.html, prop).and_then(|v| non_empty(clean_text(&v)))
        })
    }
}

impl Rule<Vec<String>> {
    /// Capture group 1 of every match, in document order.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex.
    #[must_use]
    pub fn pattern_all(name: &'static str, pattern: &str) -> Self {
        let re = compile(pattern);
        Self::new(name, move |page| {
            let items = captures_all(&re, page.html);
            (!items.is_empty()).then_some(items)
        })
    }

    /// Locates a block with `block_pattern` (group 1), then collects
    /// `item_pattern` captures inside it.
    ///
    /// # Panics
    ///
    /// Panics if either pattern is not a valid regex.
    #[must_use]
    pub fn list_in_block(name: &'static str, block_pattern: &str, item_pattern: &str) -> Self {
        let block = compile(block_pattern);
        let item = compile(item_pattern);
        Self::new(name, move |page| {
            let body = block.captures(page.html)?.get(1)?.as_str();
            let items = captures_all(&item, body);
            (!items.is_empty()).then_some(items)
        })
    }

    /// A single meta tag value wrapped in a list.
    #[must_use]
    pub fn meta_list(name: &'static str, key: &'static str) -> Self {
        Self::new(name, move |page| {
            find_meta_content(page.html, key).map(|v| vec![v])
        })
    }
}

impl Rule<Vec<(String, String)>> {
    /// Key/value pairs from groups 1 and 2 of every match.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex.
    #[must_use]
    pub fn pairs(name: &'static str, pattern: &str) -> Self {
        let re = compile(pattern);
        Self::new(name, move |page| {
            let pairs = pairs_all(&re, page.html);
            (!pairs.is_empty()).then_some(pairs)
        })
    }

    /// Key/value pairs collected only inside the block matched by
    /// `block_pattern` (group 1).
    ///
    /// # Panics
    ///
    /// Panics if either pattern is not a valid regex.
    #[must_use]
    pub fn pairs_in_block(name: &'static str, block_pattern: &str, pair_pattern: &str) -> Self {
        let block = compile(block_pattern);
        let pair = compile(pair_pattern);
        Self::new(name, move |page| {
            let body = block.captures(page.html)?.get(1)?.as_str();
            let pairs = pairs_all(&pair, body);
            (!pairs.is_empty()).then_some(pairs)
        })
    }
}

fn captures_all(re: &Regex, haystack: &str) -> Vec<String> {
    re.captures_iter(haystack)
        .filter_map(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn pairs_all(re: &Regex, haystack: &str) -> Vec<(String, String)> {
    re.captures_iter(haystack)
        .filter_map(|c| {
            let key = clean_text(c.get(1)?.as_str());
            let value = clean_text(c.get(2)?.as_str());
            (!key.is_empty() && !value.is_empty()).then_some((key, value))
        })
        .collect()
}

/// The ordered rule list for one product field.
pub struct FieldRules<T = String> {
    rules: Vec<Rule<T>>,
}

impl<T> std::fmt::Debug for FieldRules<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(Rule::name))
            .finish()
    }
}

impl<T> Default for FieldRules<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> FieldRules<T> {
    #[must_use]
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: Rule<T>) {
        self.rules.push(rule);
    }

    pub fn extend(&mut self, rules: impl IntoIterator<Item = Rule<T>>) {
        self.rules.extend(rules);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Names of the rules in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(Rule::name)
    }

    /// Runs the rules in order and returns the first value `accept` keeps,
    /// along with the name of the rule that produced it.
    pub fn first_accepted<U>(
        &self,
        page: &Page<'_>,
        accept: impl Fn(T) -> Option<U>,
    ) -> Option<(U, &'static str)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(page).and_then(&accept).map(|v| (v, rule.name)))
    }
}
