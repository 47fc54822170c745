// src/extract/html.rs
// =============================================================================
// This module extracts crawlable references from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Decodes HTML entities in attribute values for us
//
// For every page we collect:
// - href targets of any element (<a>, <link>, <area>, ...)
// - form actions
// - whether the page has a file upload input
// - src targets of any element (<script>, <iframe>, ...)
//
// Values are returned raw. Resolution against the page URL happens in the
// crawl coordinator with `resolve`, because the base is the *response* URL,
// not the site origin.
// =============================================================================

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

// These selectors are constants and known to be valid, so unwrap() can
// only fail on a programmer error
static HREF_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[href]").unwrap());
static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form[action]").unwrap());
static INPUT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[type]").unwrap());
static SRC_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[src]").unwrap());

/// Raw references found on one HTML page
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub hrefs: Vec<String>,
    pub forms: Vec<String>,
    pub has_upload: bool,
    pub sources: Vec<String>,
}

/// Parses an HTML document and collects its references
pub fn parse_page(html: &str) -> PageLinks {
    let document = Html::parse_document(html);

    let attr_values = |selector: &Selector, attr: &str| -> Vec<String> {
        document
            .select(selector)
            .filter_map(|element| element.value().attr(attr))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    };

    let has_upload = document.select(&INPUT_SELECTOR).any(|input| {
        input
            .value()
            .attr("type")
            .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("file"))
    });

    PageLinks {
        hrefs: attr_values(&HREF_SELECTOR, "href"),
        forms: attr_values(&FORM_SELECTOR, "action"),
        has_upload,
        sources: attr_values(&SRC_SELECTOR, "src"),
    }
}

/// Resolves a possibly-relative reference against a base URL
///
/// Returns None for in-page anchors, non-HTTP schemes (mailto:, tel:,
/// javascript:, data:) and anything the url crate cannot join.
///
/// Examples with base = "https://example.com/docs/page":
///   "/about"          -> https://example.com/about
///   "intro"           -> https://example.com/docs/intro
///   "//cdn.a.com/x"   -> https://cdn.a.com/x
///   "#top"            -> None
pub fn resolve(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let url = base.join(reference).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}
