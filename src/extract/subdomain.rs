// src/extract/subdomain.rs
// =============================================================================
// SubdomainFinder: host names under the target's registrable domain.
//
// The pattern is a DNS label grammar (`label.label.` ...) followed by the
// escaped domain, so for "example.com" it finds "api.example.com" and
// "a.b.example.com" anywhere in a body. Matches are then cleaned:
// - lower-cased and trimmed
// - a leading wildcard marker "*." is removed
// - leftovers of percent-encoding ("2f", "3a", "40", ...) at the start are
//   stripped, as are stray '-' and a leading '.'
// =============================================================================

use crate::config::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const LABELS: &str = r"(?i)(([a-zA-Z0-9]{1}|[_a-zA-Z0-9]{1}[_a-zA-Z0-9-]{0,61}[a-zA-Z0-9]{1})[.]{1})+";

static ENCODING_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^((20)|(25)|(2b)|(2f)|(3d)|(3a)|(40))+").unwrap());

/// Subdomain matcher compiled for one registrable domain
#[derive(Debug, Clone)]
pub struct SubdomainFinder {
    pattern: Regex,
}

impl SubdomainFinder {
    pub fn new(domain: &str) -> Result<Self, ConfigError> {
        let pattern = format!("{}{}", LABELS, regex::escape(domain));
        let pattern = Regex::new(&pattern).map_err(|source| ConfigError::Pattern {
            name: "subdomain",
            pattern,
            source,
        })?;
        Ok(SubdomainFinder { pattern })
    }

    /// Distinct cleaned subdomains in the body, in first-seen order
    pub fn find(&self, body: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.pattern
            .find_iter(body)
            .map(|m| clean_subdomain(m.as_str()))
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}

/// Normalises a raw subdomain match
pub fn clean_subdomain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut name = lowered.strip_prefix("*.").unwrap_or(&lowered);

    while let Some(m) = ENCODING_ARTIFACT.find(name) {
        name = &name[m.end()..];
    }

    let name = name.trim_matches('-');
    match name.strip_prefix('.') {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => name.to_string(),
    }
}
