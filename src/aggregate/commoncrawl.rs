// src/aggregate/commoncrawl.rs
// Common Crawl index (the CC-MAIN-2019-51 collection). One JSON object per
// line; lines that do not decode are skipped.

use super::{query_target, AggregatorRecord, Provider, ProviderError, ProviderKind};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub struct CommonCrawl;

#[derive(Deserialize)]
struct IndexLine {
    url: String,
    #[serde(default)]
    timestamp: String,
}

pub fn commoncrawl_url(domain: &str, include_subdomains: bool) -> String {
    format!(
        "http://index.commoncrawl.org/CC-MAIN-2019-51-index?url={}/*&output=json",
        query_target(domain, include_subdomains)
    )
}

pub fn parse_index(body: &str) -> Vec<AggregatorRecord> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<IndexLine>(line) {
            Ok(entry) => Some(AggregatorRecord::new(ProviderKind::CommonCrawl, entry.timestamp, entry.url)),
            Err(e) => {
                tracing::debug!(error = %e, "skipping common crawl line");
                None
            }
        })
        .collect()
}

#[async_trait]
impl Provider for CommonCrawl {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CommonCrawl
    }

    async fn fetch(
        &self,
        client: &Client,
        domain: &str,
        include_subdomains: bool,
    ) -> Result<Vec<AggregatorRecord>, ProviderError> {
        let body = client
            .get(commoncrawl_url(domain, include_subdomains))
            .send()
            .await?
            .text()
            .await?;
        Ok(parse_index(&body))
    }
}
