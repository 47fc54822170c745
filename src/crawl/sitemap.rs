// src/crawl/sitemap.rs
// =============================================================================
// sitemap.xml seeding.
//
// A fixed list of well-known sitemap locations is tried. A sitemap body has
// one of two shapes:
//
//   <urlset><url><loc>PAGE</loc></url>...</urlset>
//   <sitemapindex><sitemap><loc>SITEMAP</loc></sitemap>...</sitemapindex>
//
// Page locations are reported as `sitemap` and visited. Index entries are
// fetched and parsed like the well-known files, each sitemap URL at most once.
// =============================================================================

use super::Coordinator;
use crate::discovery::{Category, Discovery};
use crate::fetch::FetchOutcome;
use futures::stream::{self, StreamExt};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use url::Url;

const SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_news.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemapindex.xml",
    "/sitemap-news.xml",
    "/post-sitemap.xml",
    "/page-sitemap.xml",
    "/portfolio-sitemap.xml",
    "/home_slider-sitemap.xml",
    "/category-sitemap.xml",
    "/author-sitemap.xml",
];

// Well-known paths fetched at once
const SITEMAP_CONCURRENCY: usize = 4;

/// Locations found in one sitemap document
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SitemapEntries {
    /// `<url><loc>`: pages
    pub pages: Vec<String>,
    /// `<sitemap><loc>`: further sitemaps (index files)
    pub sitemaps: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Parent {
    None,
    Url,
    Sitemap,
}

/// Parses a sitemap or sitemap index. Malformed XML ends the parse and
/// returns whatever was read up to that point.
pub fn parse_sitemap(xml: &str) -> SitemapEntries {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = SitemapEntries::default();
    let mut parent = Parent::None;
    let mut in_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"url" => parent = Parent::Url,
                b"sitemap" => parent = Parent::Sitemap,
                b"loc" => in_loc = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"url" | b"sitemap" => parent = Parent::None,
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Text(text)) if in_loc => {
                let loc = text.unescape().unwrap_or_default();
                push_loc(&mut entries, parent, &loc);
            }
            Ok(Event::CData(data)) if in_loc => {
                let loc = String::from_utf8_lossy(&data);
                push_loc(&mut entries, parent, &loc);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(error = %e, "malformed sitemap");
                break;
            }
            _ => {}
        }
    }
    entries
}

fn push_loc(entries: &mut SitemapEntries, parent: Parent, loc: &str) {
    let loc = loc.trim();
    if loc.is_empty() {
        return;
    }
    match parent {
        Parent::Url => entries.pages.push(loc.to_string()),
        Parent::Sitemap => entries.sitemaps.push(loc.to_string()),
        Parent::None => {}
    }
}

/// Tries the well-known sitemap paths and feeds every listed page into the
/// crawl
pub async fn seed_sitemaps(coordinator: Coordinator) {
    let origin = coordinator.site().origin().clone();
    let candidates: Vec<Url> = SITEMAP_PATHS
        .iter()
        .filter_map(|path| origin.join(path).ok())
        .collect();

    let mut parsed: HashSet<String> = candidates.iter().map(|u| u.to_string()).collect();

    let found: Vec<SitemapEntries> = stream::iter(candidates)
        .map(|url| {
            let coordinator = coordinator.clone();
            async move { load(&coordinator, url).await }
        })
        .buffer_unordered(SITEMAP_CONCURRENCY)
        .filter_map(|entries| async move { entries })
        .collect()
        .await;

    let mut index_entries = Vec::new();
    for entries in found {
        report(&coordinator, &entries.pages);
        index_entries.extend(entries.sitemaps);
    }

    // Index entries are expanded one level, never re-parsing a sitemap
    for loc in index_entries {
        let Ok(url) = Url::parse(&loc) else { continue };
        if !parsed.insert(url.to_string()) {
            continue;
        }
        if let Some(entries) = load(&coordinator, url).await {
            report(&coordinator, &entries.pages);
        }
    }
}

async fn load(coordinator: &Coordinator, url: Url) -> Option<SitemapEntries> {
    tracing::debug!(url = %url, "trying sitemap");
    match coordinator.fetch_seed(&url).await {
        FetchOutcome::Response { status: 200, body, .. } => {
            tracing::info!(url = %url, "found sitemap");
            Some(parse_sitemap(&body))
        }
        _ => None,
    }
}

fn report(coordinator: &Coordinator, pages: &[String]) {
    let source = coordinator.site().origin_str().to_string();
    for page in pages {
        if coordinator.emit(Discovery::new(Category::Sitemap, page.as_str(), source.as_str())) {
            coordinator.visit(page, 1);
        }
    }
}
