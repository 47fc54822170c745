// src/aggregate/otx.rs
// =============================================================================
// AlienVault OTX URL lists.
//
// Results are paginated (50 per page); the loop follows `has_next` until the
// service says there is nothing more. With subdomains the `domain` indicator
// is queried, otherwise the `hostname` indicator.
//
// Needs an API key in OTX_API_KEY; without one the provider returns nothing.
// =============================================================================

use super::{AggregatorRecord, Provider, ProviderError, ProviderKind};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;

const API_KEY_VAR: &str = "OTX_API_KEY";

pub struct Otx {
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct UrlList {
    #[serde(default)]
    url_list: Vec<UrlEntry>,
    #[serde(default)]
    has_next: bool,
}

#[derive(Deserialize)]
struct UrlEntry {
    url: String,
    #[serde(default)]
    date: String,
}

impl Otx {
    pub fn new(api_key: Option<String>) -> Self {
        Otx {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_VAR).ok())
    }
}

pub fn otx_url(domain: &str, include_subdomains: bool, page: u32) -> String {
    let indicator = if include_subdomains { "domain" } else { "hostname" };
    format!(
        "https://otx.alienvault.com/api/v1/indicators/{}/{}/url_list?limit=50&page={}",
        indicator, domain, page
    )
}

/// One page of results plus whether another page follows
pub fn parse_page(body: &str) -> Result<(Vec<AggregatorRecord>, bool), serde_json::Error> {
    let list: UrlList = serde_json::from_str(body)?;
    let records = list
        .url_list
        .into_iter()
        .map(|entry| AggregatorRecord::new(ProviderKind::Otx, entry.date, entry.url))
        .collect();
    Ok((records, list.has_next))
}

/// Fetches pages 1, 2, ... until a page reports `has_next == false`
pub async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<AggregatorRecord>, ProviderError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(Vec<AggregatorRecord>, bool), ProviderError>>,
{
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let (records, has_next) = fetch_page(page).await?;
        all.extend(records);
        if !has_next {
            return Ok(all);
        }
        page += 1;
    }
}

#[async_trait]
impl Provider for Otx {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Otx
    }

    async fn fetch(
        &self,
        client: &Client,
        domain: &str,
        include_subdomains: bool,
    ) -> Result<Vec<AggregatorRecord>, ProviderError> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("{} is not set, skipping AlienVault OTX", API_KEY_VAR);
            return Ok(Vec::new());
        };

        collect_pages(|page| async move {
            let body = client
                .get(otx_url(domain, include_subdomains, page))
                .header("X-OTX-API-KEY", api_key.as_str())
                .send()
                .await?
                .text()
                .await?;
            Ok::<_, ProviderError>(parse_page(&body)?)
        })
        .await
    }
}
