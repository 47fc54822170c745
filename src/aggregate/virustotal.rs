// src/aggregate/virustotal.rs
// VirusTotal v2 domain report; the URLs come from `detected_urls`.
// Needs an API key in VT_API_KEY, otherwise returns nothing.

use super::{AggregatorRecord, Provider, ProviderError, ProviderKind};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const API_KEY_VAR: &str = "VT_API_KEY";
const REPORT_URL: &str = "https://www.virustotal.com/vtapi/v2/domain/report";

pub struct VirusTotal {
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct DomainReport {
    #[serde(default)]
    detected_urls: Vec<DetectedUrl>,
}

#[derive(Deserialize)]
struct DetectedUrl {
    url: String,
    #[serde(default)]
    scan_date: String,
}

impl VirusTotal {
    pub fn new(api_key: Option<String>) -> Self {
        VirusTotal {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_VAR).ok())
    }
}

pub fn parse_report(body: &str) -> Result<Vec<AggregatorRecord>, serde_json::Error> {
    let report: DomainReport = serde_json::from_str(body)?;
    Ok(report
        .detected_urls
        .into_iter()
        .map(|u| AggregatorRecord::new(ProviderKind::VirusTotal, u.scan_date, u.url))
        .collect())
}

#[async_trait]
impl Provider for VirusTotal {
    fn kind(&self) -> ProviderKind {
        ProviderKind::VirusTotal
    }

    // The report is per domain; there is no subdomain switch
    async fn fetch(
        &self,
        client: &Client,
        domain: &str,
        _include_subdomains: bool,
    ) -> Result<Vec<AggregatorRecord>, ProviderError> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("{} is not set, skipping VirusTotal", API_KEY_VAR);
            return Ok(Vec::new());
        };

        let body = client
            .get(REPORT_URL)
            .query(&[("apikey", api_key.as_str()), ("domain", domain)])
            .send()
            .await?
            .text()
            .await?;
        Ok(parse_report(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report() {
        let body = r#"{"response_code": 1,
            "detected_urls": [
                {"url": "http://example.com/bad", "positives": 2, "total": 70, "scan_date": "2020-02-02 10:00:00"},
                {"url": "http://example.com/worse"}
            ],
            "subdomains": ["a.example.com"]}"#;
        let records = parse_report(body).unwrap();
        let urls: Vec<_> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["http://example.com/bad", "http://example.com/worse"]);
        assert_eq!(records[0].date, "2020-02-02 10:00:00");
    }

    #[test]
    fn test_report_without_urls() {
        assert!(parse_report(r#"{"response_code": 0, "verbose_msg": "Domain not found"}"#)
            .unwrap()
            .is_empty());
    }
}
