// src/aggregate/wayback.rs
// Internet Archive CDX index. The response is a JSON array of rows; the first
// row is the column header and each following row is
// [urlkey, timestamp, original, ...].

use super::{query_target, AggregatorRecord, Provider, ProviderError, ProviderKind};
use async_trait::async_trait;
use reqwest::Client;

pub struct Wayback;

pub fn wayback_url(domain: &str, include_subdomains: bool) -> String {
    format!(
        "http://web.archive.org/cdx/search/cdx?url={}/*&output=json&collapse=urlkey",
        query_target(domain, include_subdomains)
    )
}

pub fn parse_cdx(body: &str) -> Result<Vec<AggregatorRecord>, serde_json::Error> {
    // No captures at all comes back as an empty body
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<Vec<String>> = serde_json::from_str(body)?;
    Ok(rows
        .into_iter()
        .skip(1)
        .filter_map(|row| {
            let date = row.get(1)?;
            let url = row.get(2)?;
            Some(AggregatorRecord::new(ProviderKind::Wayback, date.as_str(), url.as_str()))
        })
        .collect())
}

#[async_trait]
impl Provider for Wayback {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Wayback
    }

    async fn fetch(
        &self,
        client: &Client,
        domain: &str,
        include_subdomains: bool,
    ) -> Result<Vec<AggregatorRecord>, ProviderError> {
        let body = client
            .get(wayback_url(domain, include_subdomains))
            .send()
            .await?
            .text()
            .await?;
        Ok(parse_cdx(&body)?)
    }
}
