// src/crawl/session.rs
// =============================================================================
// One site's crawl session, from seeding to idle.
//
//   start()   -> the origin goes on the page queue (depth 1)
//   seeders   -> robots.txt, sitemaps and third-party sources, run alongside
//                the crawl as separate tasks
//   wait()    -> every seeder has finished and both queues are idle
//
// Seeders only ever talk to the crawl through `Coordinator::emit` and
// `Coordinator::visit`, so they need no knowledge of the queues.
// =============================================================================

use super::robots::seed_robots;
use super::sitemap::seed_sitemaps;
use super::Coordinator;
use crate::aggregate::Aggregator;
use crate::discovery::{Category, Discovery};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Third-party URL sources for a session
#[derive(Clone)]
pub struct OtherSources {
    pub aggregator: Arc<Aggregator>,
    /// Ask providers for `*.domain` rather than the host alone
    pub include_subdomains: bool,
    /// Also crawl what the providers report, not just print it
    pub visit: bool,
}

/// Which seeders run besides the origin itself
#[derive(Clone, Default)]
pub struct Seeds {
    pub robots: bool,
    pub sitemap: bool,
    pub other_sources: Option<OtherSources>,
}

/// Runs the session to completion
pub async fn run_session(coordinator: Coordinator, seeds: Seeds) {
    let site = coordinator.site().origin_str().to_string();
    tracing::info!(site = %site, "crawl started");

    coordinator.start();

    let mut seeders = JoinSet::new();
    if seeds.robots {
        seeders.spawn(seed_robots(coordinator.clone()));
    }
    if seeds.sitemap {
        seeders.spawn(seed_sitemaps(coordinator.clone()));
    }
    if let Some(sources) = seeds.other_sources {
        seeders.spawn(seed_other_sources(coordinator.clone(), sources));
    }
    while let Some(joined) = seeders.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(site = %site, error = %e, "seeder task failed");
        }
    }

    coordinator.wait().await;
    tracing::info!(site = %site, "crawl finished");
}

/// Reports every URL the aggregator knows for the site host, and crawls
/// them when asked to
pub async fn seed_other_sources(coordinator: Coordinator, sources: OtherSources) {
    let host = coordinator.site().hostname().to_string();
    let source = coordinator.site().origin_str().to_string();

    let urls = sources
        .aggregator
        .fetch_all(&host, sources.include_subdomains)
        .await;
    tracing::info!(host = %host, count = urls.len(), "other sources finished");

    for url in urls {
        if coordinator.emit(Discovery::new(Category::OtherSource, url.as_str(), source.as_str()))
            && sources.visit
        {
            coordinator.visit(&url, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregatorRecord, Provider, ProviderError, ProviderKind};
    use crate::crawl::Limits;
    use crate::fetch::testing::StaticFetcher;
    use crate::fetch::Fetchers;
    use crate::output::MemorySink;
    use crate::scope::{ScopeFilter, ScopeRules};
    use crate::site::Site;
    use async_trait::async_trait;
    use reqwest::Client;

    struct Archive;

    #[async_trait]
    impl Provider for Archive {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Wayback
        }

        async fn fetch(&self, _: &Client, domain: &str, _: bool) -> Result<Vec<AggregatorRecord>, ProviderError> {
            assert_eq!(domain, "www.example.com");
            Ok(vec![
                AggregatorRecord::new(ProviderKind::Wayback, "2019", "https://www.example.com/old"),
                AggregatorRecord::new(ProviderKind::Wayback, "2019", "https://elsewhere.net/x"),
            ])
        }
    }

    fn session(fetcher: Arc<StaticFetcher>, sink: Arc<MemorySink>) -> Coordinator {
        let site = Site::parse("https://www.example.com").unwrap();
        let scope = ScopeFilter::new(&site, &ScopeRules::default()).unwrap();
        Coordinator::new(site, scope, Fetchers::shared(fetcher), sink, Limits::default()).unwrap()
    }

    fn sources(visit: bool) -> OtherSources {
        OtherSources {
            aggregator: Arc::new(Aggregator::with_providers(Client::new(), vec![Arc::new(Archive)])),
            include_subdomains: false,
            visit,
        }
    }

    #[tokio::test]
    async fn test_other_sources_reported_but_not_crawled_by_default() {
        let fetcher = Arc::new(StaticFetcher::new());
        let sink = Arc::new(MemorySink::default());
        let seeds = Seeds {
            other_sources: Some(sources(false)),
            ..Default::default()
        };
        run_session(session(fetcher.clone(), sink.clone()), seeds).await;

        assert_eq!(
            sink.values(Category::OtherSource),
            vec!["https://elsewhere.net/x", "https://www.example.com/old"]
        );
        assert_eq!(fetcher.request_count("https://www.example.com/old"), 0);
        assert_eq!(fetcher.request_count("https://www.example.com/"), 1);
    }

    #[tokio::test]
    async fn test_other_sources_crawled_in_scope() {
        let fetcher = Arc::new(StaticFetcher::new().page("https://www.example.com/old", 200, "old page"));
        let sink = Arc::new(MemorySink::default());
        let seeds = Seeds {
            other_sources: Some(sources(true)),
            ..Default::default()
        };
        run_session(session(fetcher.clone(), sink.clone()), seeds).await;

        assert_eq!(fetcher.request_count("https://www.example.com/old"), 1);
        assert_eq!(fetcher.request_count("https://elsewhere.net/x"), 0);
        assert!(sink.values(Category::Url).contains(&"https://www.example.com/old".to_string()));
    }

    #[tokio::test]
    async fn test_full_session_with_robots() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page("https://www.example.com/", 200, r#"<a href="/a">a</a>"#)
                .page("https://www.example.com/robots.txt", 200, "Disallow: /secret\n")
                .page("https://www.example.com/secret", 200, "s"),
        );
        let sink = Arc::new(MemorySink::default());
        let seeds = Seeds {
            robots: true,
            sitemap: true,
            other_sources: None,
        };
        run_session(session(fetcher.clone(), sink.clone()), seeds).await;

        assert_eq!(sink.values(Category::Robots), vec!["https://www.example.com/secret"]);
        assert_eq!(fetcher.request_count("https://www.example.com/secret"), 1);
        assert_eq!(fetcher.request_count("https://www.example.com/sitemap.xml"), 1);
        // Default depth is 1: the href is reported, not fetched
        assert_eq!(fetcher.request_count("https://www.example.com/a"), 0);
        assert!(sink.values(Category::Href).contains(&"https://www.example.com/a".to_string()));
    }
}
