// src/aggregate/mod.rs
// =============================================================================
// Third-party URL sources ("other sources").
//
// Public archives and threat-intel services already know many URLs of a
// domain. The Aggregator asks every configured provider at once and returns
// the union of what they know.
//
// Providers:
// - wayback:      the Internet Archive CDX index
// - commoncrawl:  the Common Crawl index
// - otx:          AlienVault OTX URL lists (needs OTX_API_KEY)
// - virustotal:   VirusTotal domain reports (needs VT_API_KEY)
//
// A provider that fails is logged and ignored; it never takes the others
// down with it.
//
// Rust concepts:
// - async_trait: async methods in a trait object (`Arc<dyn Provider>`)
// - mpsc channel: every provider task sends into one receiver, and the
//   receive loop ends once all senders are dropped
// =============================================================================

mod commoncrawl;
mod otx;
mod virustotal;
mod wayback;

pub use commoncrawl::CommonCrawl;
pub use otx::Otx;
pub use virustotal::VirusTotal;
pub use wayback::Wayback;

use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Wayback,
    CommonCrawl,
    Otx,
    VirusTotal,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Wayback => "wayback",
            ProviderKind::CommonCrawl => "commoncrawl",
            ProviderKind::Otx => "otx",
            ProviderKind::VirusTotal => "virustotal",
        };
        f.write_str(name)
    }
}

/// One URL as reported by a provider. `date` is whatever the provider
/// gives (empty when it gives nothing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorRecord {
    pub date: String,
    pub url: String,
    pub provider: ProviderKind,
}

impl AggregatorRecord {
    pub fn new(provider: ProviderKind, date: impl Into<String>, url: impl Into<String>) -> Self {
        AggregatorRecord {
            date: date.into(),
            url: url.into(),
            provider,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn fetch(
        &self,
        client: &Client,
        domain: &str,
        include_subdomains: bool,
    ) -> Result<Vec<AggregatorRecord>, ProviderError>;
}

pub struct Aggregator {
    client: Client,
    providers: Vec<Arc<dyn Provider>>,
}

impl Aggregator {
    /// All four providers; the credentialed ones read their keys from the
    /// environment now
    pub fn new(client: Client) -> Self {
        Self::with_providers(
            client,
            vec![
                Arc::new(Wayback),
                Arc::new(CommonCrawl),
                Arc::new(Otx::from_env()),
                Arc::new(VirusTotal::from_env()),
            ],
        )
    }

    pub fn with_providers(client: Client, providers: Vec<Arc<dyn Provider>>) -> Self {
        Aggregator { client, providers }
    }

    /// Queries every provider concurrently and returns the distinct URLs
    /// they reported. Failed providers contribute nothing.
    pub async fn fetch_all(&self, domain: &str, include_subdomains: bool) -> BTreeSet<String> {
        let (tx, mut rx) = mpsc::channel::<AggregatorRecord>(256);

        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let client = self.client.clone();
            let domain = domain.to_string();
            let tx = tx.clone();

            tokio::spawn(async move {
                let kind = provider.kind();
                match provider.fetch(&client, &domain, include_subdomains).await {
                    Ok(records) => {
                        tracing::info!(provider = %kind, count = records.len(), "provider finished");
                        for record in records {
                            if tx.send(record).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => tracing::warn!(provider = %kind, error = %e, "provider failed"),
                }
            });
        }
        // Only the task clones remain; the loop below ends when they finish
        drop(tx);

        let mut urls = BTreeSet::new();
        while let Some(record) = rx.recv().await {
            tracing::trace!(provider = %record.provider, date = %record.date, url = %record.url, "archived url");
            let url = record.url.trim();
            if !url.is_empty() {
                urls.insert(url.to_string());
            }
        }
        urls
    }
}

/// The query target: `*.domain` when subdomains are wanted
fn query_target(domain: &str, include_subdomains: bool) -> String {
    if include_subdomains {
        format!("*.{}", domain)
    } else {
        domain.to_string()
    }
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `Arc<dyn Provider>`?
//    - Each provider is a different type, but they share one trait
//    - `dyn Provider` lets them live in one Vec
//    - Arc lets every spawned task hold its own handle to the provider
//
// 2. Why drop(tx) before the receive loop?
//    - recv() returns None only once every Sender is gone
//    - The tasks hold clones; our own copy must go too, or the loop never ends
//
// 3. Why BTreeSet for the result?
//    - It removes duplicates and keeps the URLs sorted
//    - Sorted output makes runs easy to compare
// -----------------------------------------------------------------------------
