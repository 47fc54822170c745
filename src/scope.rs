// src/scope.rs
// =============================================================================
// Scope filtering: which URLs may be fetched as pages.
//
// Rules are evaluated in a fixed order:
// 1. Deny rules (static media/style/font extensions, optional --blacklist).
//    Any match means "out of scope", whatever the allow rules say.
// 2. Allow rules. The URL must match at least one. The allow pattern is the
//    operator's --whitelist, else --whitelist-domain, else the site itself
//    (exact hostname, or any host under the registrable domain with --subs).
//
// The filter also carries the response-length denylist (--filter-length).
// Lengths in that set hide a response from the output; they never stop the
// request itself.
// =============================================================================

use crate::config::ConfigError;
use crate::site::Site;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// Static media/style/font denylist, matched case-insensitively at the end of
// the path (before any query string or fragment)
static STATIC_DENY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\.(png|apng|bmp|gif|ico|cur|jpg|jpeg|jfif|pjp|pjpeg|svg|tif|tiff|webp|xbm|3gp|aac|flac|mpg|mpeg|mp3|mp4|m4a|m4v|m4p|oga|ogg|ogv|mov|wav|webm|eot|woff|woff2|ttf|otf|css)(?:\?|#|$)",
    )
    .unwrap()
});

/// Operator-supplied scope settings, compiled once per process
#[derive(Debug, Clone, Default)]
pub struct ScopeRules {
    pub whitelist: Option<Regex>,
    pub whitelist_domain: Option<String>,
    pub blacklist: Option<Regex>,
    /// Widen the default allow rule to every host under the registrable domain
    pub include_subdomains: bool,
    pub filter_lengths: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct ScopeFilter {
    allow: Vec<Regex>,
    deny: Vec<Regex>,
    filtered_lengths: HashSet<usize>,
}

impl ScopeFilter {
    pub fn new(site: &Site, rules: &ScopeRules) -> Result<Self, ConfigError> {
        let mut deny = vec![STATIC_DENY.clone()];
        deny.extend(rules.blacklist.clone());

        let allow = if let Some(whitelist) = &rules.whitelist {
            whitelist.clone()
        } else if let Some(domain) = &rules.whitelist_domain {
            compile("whitelist-domain", &suffix_pattern(domain))?
        } else if rules.include_subdomains {
            compile("site", &suffix_pattern(site.domain()))?
        } else {
            compile("site", &host_pattern(site.hostname()))?
        };

        Ok(ScopeFilter {
            allow: vec![allow],
            deny,
            filtered_lengths: rules.filter_lengths.iter().copied().collect(),
        })
    }

    /// True when the URL may be crawled as a page
    pub fn in_scope(&self, url: &str) -> bool {
        if self.deny.iter().any(|re| re.is_match(url)) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|re| re.is_match(url))
    }

    /// True when responses of this body length must not be reported
    pub fn suppresses_length(&self, length: usize) -> bool {
        self.filtered_lengths.contains(&length)
    }
}

// Port and path boundary shared by the generated host patterns
const HOST_END: &str = r"(?::\d+)?(?:[/?#]|$)";

fn host_pattern(hostname: &str) -> String {
    format!(r"^https?://{}{}", regex::escape(hostname), HOST_END)
}

fn suffix_pattern(domain: &str) -> String {
    format!(r"^https?://(?:[^/?#@]*\.)?{}{}", regex::escape(domain), HOST_END)
}

pub fn compile(name: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        name,
        pattern: pattern.to_string(),
        source,
    })
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why escape the hostname before putting it in a regex?
//    - A hostname is full of dots, and `.` in a regex matches any character
//    - regex::escape turns "www.example.com" into "www\.example\.com"
//    - Without it "wwwXexample.com" would be in scope
//
// 2. Why does the pattern end with `(?:[/?#]|$)`?
//    - Otherwise "https://example.com.evil.net/" matches the prefix
//      "https://example.com"
//    - The host must be followed by a path, a query, a fragment or nothing
//
// 3. Why check the deny list first?
//    - A --blacklist must win even against a --whitelist that matches
//      everything
//
// 4. Is cloning a Regex expensive?
//    - No, the compiled program is shared internally
//    - That is why ScopeRules can be Clone and handed to every session
// -----------------------------------------------------------------------------
