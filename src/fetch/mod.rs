// src/fetch/mod.rs
// =============================================================================
// The fetch boundary between the crawler and the network.
//
// The crawl coordinator never talks to reqwest directly. It asks a Fetcher
// for a URL and gets back a FetchOutcome:
// - Response: a 2xx status, the final URL (after redirects) and the body
// - Error: any other status, or status 0 when no response arrived at all
//
// A crawl holds two Fetchers (see Fetchers): pages go out with the
// operator's cookie and headers, assets without them, since the asset queue
// fetches scripts from any host.
//
// Submodules:
// - http: the reqwest-backed Fetcher used by the binary
// - agent: user-agent selection (random desktop / mobile, or fixed)
// =============================================================================

mod agent;
mod http;

pub use agent::UserAgent;
pub use http::{FetchSettings, HttpFetcher};

use crate::config::ConfigError;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Response {
        url: Url,
        status: u16,
        body: String,
    },
    Error {
        url: Url,
        status: u16,
        message: String,
    },
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchOutcome;
}

/// The Fetcher per queue. `assets` must not carry the target's credentials.
#[derive(Clone)]
pub struct Fetchers {
    pub pages: Arc<dyn Fetcher>,
    pub assets: Arc<dyn Fetcher>,
}

impl Fetchers {
    /// Builds the credentialed page fetcher and the bare asset fetcher
    pub fn from_settings(settings: &FetchSettings) -> Result<Self, ConfigError> {
        Ok(Fetchers {
            pages: Arc::new(HttpFetcher::new(settings)?),
            assets: Arc::new(HttpFetcher::new(&settings.without_credentials())?),
        })
    }

    /// One fetcher for both queues
    #[cfg(test)]
    pub fn shared(fetcher: Arc<dyn Fetcher>) -> Self {
        Fetchers {
            pages: Arc::clone(&fetcher),
            assets: fetcher,
        }
    }
}

/// In-memory Fetcher for tests: serves canned bodies and records every
/// request it receives
#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, (u16, String)>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, status: u16, body: &str) -> Self {
            self.pages.insert(url.to_string(), (status, body.to_string()));
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self, url: &str) -> usize {
            self.requests().iter().filter(|r| r.as_str() == url).count()
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &Url) -> FetchOutcome {
            self.requests.lock().unwrap().push(url.to_string());
            match self.pages.get(url.as_str()) {
                Some((status, body)) if (200..300).contains(status) => FetchOutcome::Response {
                    url: url.clone(),
                    status: *status,
                    body: body.clone(),
                },
                Some((status, _)) => FetchOutcome::Error {
                    url: url.clone(),
                    status: *status,
                    message: format!("HTTP {}", status),
                },
                None => FetchOutcome::Error {
                    url: url.clone(),
                    status: 404,
                    message: "HTTP 404".to_string(),
                },
            }
        }
    }
}
