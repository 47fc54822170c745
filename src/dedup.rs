// src/dedup.rs
// =============================================================================
// Per-category "already emitted" registry.
//
// Every response is handled on whichever task fetched it, so many tasks may
// report the same script or subdomain at the same time. The registry is the
// single point where they agree on who reports it first: one HashSet per
// category behind a Mutex, first writer wins.
//
// Values are canonicalised before lookup:
// - URLs lose their fragment (scheme + host + path + query remain)
// - subdomains and buckets are trimmed and lower-cased
// =============================================================================

use crate::discovery::Category;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use url::Url;

#[derive(Debug, Default)]
pub struct DedupRegistry {
    seen: Mutex<HashMap<Category, HashSet<String>>>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and records the value) the first time a
    /// (category, value) pair is seen, true on every later call.
    pub fn duplicate(&self, category: Category, value: &str) -> bool {
        let key = canonical(category, value);
        // Inserts are all-or-nothing, so a poisoned set is still consistent
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        !seen.entry(category).or_default().insert(key)
    }

    /// Number of distinct values recorded for a category
    #[cfg(test)]
    pub fn count(&self, category: Category) -> usize {
        let seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.get(&category).map_or(0, HashSet::len)
    }
}

/// The dedup key for a value in a category
pub fn canonical(category: Category, value: &str) -> String {
    let value = value.trim();
    if category.is_url_valued() {
        if let Ok(mut url) = Url::parse(value) {
            url.set_fragment(None);
            return url.into();
        }
        return value.to_string();
    }
    value.to_lowercase()
}
