// src/extract/decode.rs
// =============================================================================
// Body normalisation applied before the regex engines run.
//
// Scripts and JSON often hide URLs behind encodings:
//   https%3A%2F%2Fapi.example.com      (percent-encoding)
//   https:\u002f\u002fapi.example.com      (JSON unicode escapes)
//   /search?a=1&amp;b=2                (HTML entities)
// All three are undone here so the matchers see plain text.
// =============================================================================

use regex::{Captures, Regex};
use std::sync::LazyLock;

static UNICODE_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\\u00(2f|26|3d|3a)").unwrap());

static HTML_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&(amp|quot|lt|gt|#39|#x27|#x2f|#47);").unwrap());

/// Decodes a raw response body into the text the extraction engines expect.
///
/// Percent-decoding is lenient: malformed escapes stay as they are and `+`
/// is left alone (bodies are not query strings).
pub fn decode_body(body: &str) -> String {
    let bytes = urlencoding::decode_binary(body.as_bytes());
    let text = String::from_utf8_lossy(&bytes);

    let text = UNICODE_ESCAPE.replace_all(&text, |caps: &Captures| {
        match caps[1].to_ascii_lowercase().as_str() {
            "2f" => "/",
            "26" => "&",
            "3d" => "=",
            _ => ":",
        }
    });

    HTML_ENTITY
        .replace_all(&text, |caps: &Captures| {
            match caps[1].to_ascii_lowercase().as_str() {
                "amp" => "&",
                "quot" => "\"",
                "lt" => "<",
                "gt" => ">",
                "#39" | "#x27" => "'",
                _ => "/",
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decoding() {
        assert_eq!(decode_body("https%3A%2F%2Fa.com%2Fx"), "https://a.com/x");
    }

    #[test]
    fn test_malformed_escapes_are_kept() {
        assert_eq!(decode_body("100%zz a+b"), "100%zz a+b");
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(
            decode_body(r#""https:\u002F\u002Fs.yimg.com\u002fnq?a\u003d1\u0026b=2""#),
            r#""https://s.yimg.com/nq?a=1&b=2""#
        );
    }

    #[test]
    fn test_html_entities() {
        assert_eq!(decode_body("/search?a=1&amp;b=&quot;x&quot;&#x2F;"), "/search?a=1&b=\"x\"/");
    }
}
