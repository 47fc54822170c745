// src/fetch/http.rs
// =============================================================================
// The reqwest-backed Fetcher.
//
// One Client is built per process and reused for every request (connection
// pooling). Everything the operator can tune about a request lives here:
// - timeout, proxy, redirect policy
// - user agent (random per request, or fixed)
// - extra headers and a raw Cookie header (page fetches only; the asset
//   fetcher is built from `without_credentials()`)
//
// TLS certificates are not verified: targets of a content discovery crawl
// routinely sit behind self-signed or expired certificates.
// =============================================================================

use super::{FetchOutcome, Fetcher, UserAgent};
use crate::config::ConfigError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, USER_AGENT};
use reqwest::{redirect, Client, Proxy};
use std::time::Duration;
use url::Url;

// Redirect hops followed when redirects are enabled
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub user_agent: UserAgent,
    /// Extra request headers as (name, value) pairs
    pub headers: Vec<(String, String)>,
    pub cookie: Option<String>,
    pub follow_redirects: bool,
}

impl FetchSettings {
    /// Same transport settings, no extra headers and no cookie
    pub fn without_credentials(&self) -> FetchSettings {
        FetchSettings {
            headers: Vec::new(),
            cookie: None,
            ..self.clone()
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            timeout: Duration::from_secs(10),
            proxy: None,
            user_agent: UserAgent::Web,
            headers: Vec::new(),
            cookie: None,
            follow_redirects: true,
        }
    }
}

pub struct HttpFetcher {
    client: Client,
    user_agent: UserAgent,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, ConfigError> {
        let headers = default_headers(settings)?;

        let policy = if settings.follow_redirects {
            redirect::Policy::limited(MAX_REDIRECTS)
        } else {
            redirect::Policy::none()
        };

        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .redirect(policy)
            .default_headers(headers)
            .danger_accept_invalid_certs(true);

        if let Some(proxy) = &settings.proxy {
            let proxy = Proxy::all(proxy).map_err(|source| ConfigError::Proxy {
                proxy: proxy.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }

        Ok(HttpFetcher {
            client: builder.build().map_err(ConfigError::Client)?,
            user_agent: settings.user_agent.clone(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        let request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, self.user_agent.pick());

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchOutcome::Error {
                    url: url.clone(),
                    status: e.status().map_or(0, |s| s.as_u16()),
                    message: describe_error(&e),
                }
            }
        };

        let status = response.status();
        let final_url = response.url().clone();
        match response.text().await {
            Ok(body) if status.is_success() => FetchOutcome::Response {
                url: final_url,
                status: status.as_u16(),
                body,
            },
            Ok(_) => FetchOutcome::Error {
                url: final_url,
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            },
            Err(e) => FetchOutcome::Error {
                url: final_url,
                status: status.as_u16(),
                message: describe_error(&e),
            },
        }
    }
}

// Headers sent with every request. A repeated name keeps all its values.
fn default_headers(settings: &FetchSettings) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &settings.headers {
        let invalid = || ConfigError::Header(format!("{}: {}", name, value));
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.append(name, value);
    }
    if let Some(cookie) = &settings.cookie {
        let value = HeaderValue::from_str(cookie)
            .map_err(|_| ConfigError::Header(format!("Cookie: {}", cookie)))?;
        headers.insert(COOKIE, value);
    }
    Ok(headers)
}

// Short human description of a transport error
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_headers_and_cookie() {
        let settings = FetchSettings {
            headers: vec![("X-Test".to_string(), "1".to_string())],
            cookie: Some("a=b; c=d".to_string()),
            follow_redirects: false,
            ..Default::default()
        };
        assert!(HttpFetcher::new(&settings).is_ok());
    }

    #[test]
    fn test_repeated_header_keeps_every_value() {
        let settings = FetchSettings {
            headers: vec![
                ("X-A".to_string(), "1".to_string()),
                ("X-A".to_string(), "2".to_string()),
            ],
            ..Default::default()
        };
        let headers = default_headers(&settings).unwrap();
        let values: Vec<_> = headers.get_all("X-A").iter().map(|v| v.to_str().unwrap()).collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn test_asset_settings_carry_no_credentials() {
        let settings = FetchSettings {
            headers: vec![("Authorization".to_string(), "Bearer t".to_string())],
            cookie: Some("session=abc".to_string()),
            proxy: Some("http://127.0.0.1:8080".to_string()),
            timeout: Duration::from_secs(3),
            ..Default::default()
        };
        assert_eq!(default_headers(&settings).unwrap().len(), 2);

        let bare = settings.without_credentials();
        assert!(default_headers(&bare).unwrap().is_empty());
        assert_eq!(bare.proxy, settings.proxy);
        assert_eq!(bare.timeout, settings.timeout);
        assert!(HttpFetcher::new(&bare).is_ok());
    }

    #[test]
    fn test_invalid_header_is_a_config_error() {
        let settings = FetchSettings {
            headers: vec![("Bad Header".to_string(), "x".to_string())],
            ..Default::default()
        };
        assert!(matches!(HttpFetcher::new(&settings), Err(ConfigError::Header(_))));
    }

    #[test]
    fn test_invalid_proxy_is_a_config_error() {
        let settings = FetchSettings {
            proxy: Some("::not a proxy::".to_string()),
            ..Default::default()
        };
        assert!(matches!(HttpFetcher::new(&settings), Err(ConfigError::Proxy { .. })));
    }
}
