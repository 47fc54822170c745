// src/extract/linkfinder.rs
// =============================================================================
// LinkFinder: pulls endpoints out of JavaScript, JSON and XML bodies.
//
// Scripts rarely contain <a href> tags. Their URLs live in string literals:
//   fetch("/api/v2/users.json?id=1")
//   load('https://cdn.example.com/lib.min.js')
// so we match quoted strings that look like URLs or paths.
//
// The pattern has one outer capture group around four alternatives:
// 1. absolute or protocol-relative URLs   "https://a.com/x", "//a.com/x"
// 2. relative paths                        "/x", "./x", "../x"
// 3. slash paths with a short extension    "api/users.json", "a/b.action"
// 4. bare file names with known extensions "login.php?next=1"
// =============================================================================

use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?:"|')("#,
        r#"((?:[a-zA-Z]{1,10}://|//)[^"'/]{1,}\.[a-zA-Z]{2,}[^"']{0,})"#,
        r#"|((?:/|\.\./|\./)[^"'><,;| *()(%%$^/\\\[\]][^"'><,;|()]{1,})"#,
        r#"|([a-zA-Z0-9_\-/]{1,}/[a-zA-Z0-9_\-/]{1,}\.(?:[a-zA-Z]{1,4}|action)(?:[\?|/][^"|']{0,})?)"#,
        r#"|([a-zA-Z0-9_\-]{1,}\.(?:php|asp|aspx|jsp|json|action|html|js|txt|xml)(?:\?[^"|^']{0,})?)"#,
        r#")(?:"|')"#,
    ))
    .unwrap()
});

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\t\r\n]+").unwrap());

// Minified bundles above this size get a line break after every `;` and `,`
// before matching
const SPLIT_THRESHOLD: usize = 1_000_000;

/// Returns the distinct quoted links found in a script/data body, in the
/// order they first appear.
pub fn find_links(body: &str) -> Vec<String> {
    let source: Cow<str> = if body.chars().count() > SPLIT_THRESHOLD {
        Cow::Owned(body.replace(';', ";\r\n").replace(',', ",\r\n"))
    } else {
        Cow::Borrowed(body)
    };

    let mut seen = HashSet::new();
    LINK_PATTERN
        .captures_iter(&source)
        .filter_map(|caps| caps.get(1))
        .map(|m| LINE_BREAKS.replace_all(m.as_str().trim(), " ").trim().to_string())
        .filter(|link| !link.is_empty())
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
