//! Regex-based markup helpers shared by the extraction rules.

use std::sync::LazyLock;

use regex::Regex;

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").expect("valid regex"));
static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(?:script|style)>").expect("valid regex")
});
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x?[0-9a-fA-F]+);").expect("valid regex"));
static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[a-z][a-z0-9]*\b[^>]*>").expect("valid regex"));

/// Strips tags, decodes entities, and collapses whitespace.
pub(crate) fn clean_text(input: &str) -> String {
    let no_scripts = SCRIPT_STYLE_RE.replace_all(input, " ");
    let no_tags = TAG_RE.replace_all(&no_scripts, " ");
    decode_entities(&no_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes the handful of HTML entities that show up in product titles and
/// prices, plus numeric character references.
pub(crate) fn decode_entities(input: &str) -> String {
    let named = input
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&pound;", "£")
        .replace("&euro;", "€")
        .replace("&trade;", "™")
        .replace("&reg;", "®");
    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |caps: &regex::Captures<'_>| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x').or_else(|| raw.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), |c| c.to_string())
    });
    // `&amp;` last so that "&amp;lt;" decodes to "&lt;" rather than "<".
    numeric.replace("&amp;", "&")
}

/// Reads a quoted attribute value from a single tag.
pub(crate) fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    // The closing quote must match the opening one: `content="Women's"`.
    let pattern = format!(
        r#"(?is)\b{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(attr)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(tag)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|s| !s.is_empty())
}

/// Finds the `content` of a `<meta>` tag keyed by `property` or `name`.
pub(crate) fn find_meta_content(html: &str, key_value: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let key = extract_attr(tag, "property").or_else(|| extract_attr(tag, "name"))?;
        if key.eq_ignore_ascii_case(key_value) {
            extract_attr(tag, "content")
        } else {
            None
        }
    })
}

/// Finds a microdata value: the `content` (or `href`) attribute of the first
/// tag carrying `itemprop="{prop}"`.
pub(crate) fn find_itemprop(html: &str, prop: &str) -> Option<String> {
    ANY_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let value = extract_attr(tag, "itemprop")?;
        if value.eq_ignore_ascii_case(prop) {
            extract_attr(tag, "content").or_else(|| extract_attr(tag, "href"))
        } else {
            None
        }
    })
}
