// src/crawl/robots.rs
// =============================================================================
// robots.txt seeding.
//
// Every `Allow:` / `Disallow:` line names a path the site owner thought worth
// mentioning, which makes it a good crawl seed. The directive prefix is cut
// with the same loose `.*llow: ` match for both forms, the remainder is
// resolved against the site origin, reported as `robots` and visited.
// =============================================================================

use super::Coordinator;
use crate::discovery::{Category, Discovery};
use crate::fetch::FetchOutcome;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".*llow: ").unwrap());

/// Paths named by Allow / Disallow lines, in file order
pub fn parse_robots(body: &str) -> Vec<String> {
    body.lines()
        .filter(|line| line.contains("llow: "))
        .map(|line| DIRECTIVE.replace_all(line, "").trim().to_string())
        .filter(|path| !path.is_empty())
        .collect()
}

/// Fetches `<origin>/robots.txt` and feeds its entries into the crawl
pub async fn seed_robots(coordinator: Coordinator) {
    let origin = coordinator.site().origin().clone();
    let Ok(robots_url) = origin.join("/robots.txt") else {
        return;
    };

    let body = match coordinator.fetch_seed(&robots_url).await {
        FetchOutcome::Response { status: 200, body, .. } => body,
        FetchOutcome::Response { status, .. } | FetchOutcome::Error { status, .. } => {
            tracing::debug!(url = %robots_url, status, "no robots.txt");
            return;
        }
    };
    tracing::info!(url = %robots_url, "found robots.txt");

    for path in parse_robots(&body) {
        let Some(target) = join_entry(&origin, &path) else {
            tracing::debug!(entry = %path, "unusable robots.txt entry");
            continue;
        };
        if coordinator.emit(Discovery::new(Category::Robots, target.as_str(), robots_url.as_str())) {
            coordinator.visit(target.as_str(), 1);
        }
    }
}

fn join_entry(origin: &Url, path: &str) -> Option<Url> {
    let url = origin.join(path).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
