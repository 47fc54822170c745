// src/site.rs
// =============================================================================
// The target site of one crawl session.
//
// A Site is built once from the operator's input and never changes:
// - origin: the parsed URL we start from
// - hostname: e.g. "www.example.co.uk"
// - domain: the registrable domain (eTLD+1), e.g. "example.co.uk"
//
// The registrable domain comes from the public suffix list (psl crate), so
// multi-part suffixes like ".co.uk" are handled correctly.
// =============================================================================

use crate::config::ConfigError;
use url::{Host, Url};

#[derive(Debug, Clone)]
pub struct Site {
    origin: Url,
    hostname: String,
    domain: String,
}

impl Site {
    /// Parses an operator-supplied site URL
    pub fn parse(input: &str) -> Result<Site, ConfigError> {
        let input = input.trim();
        let invalid = |reason: &str| ConfigError::InvalidSite {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let origin = Url::parse(input).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("only http and https sites can be crawled"));
        }

        let (hostname, domain) = match origin.host() {
            Some(Host::Domain(name)) => {
                let name = name.to_ascii_lowercase();
                // Hosts with no registrable part (localhost, bare suffixes)
                // are scoped by their full name
                let domain = psl::domain_str(&name).unwrap_or(&name).to_string();
                (name, domain)
            }
            Some(ip) => (ip.to_string(), ip.to_string()),
            None => return Err(invalid("URL has no host")),
        };

        Ok(Site {
            origin,
            hostname,
            domain,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// The origin as text, without a trailing slash, ready for `format!("{}/robots.txt")`
    pub fn origin_str(&self) -> &str {
        self.origin.as_str().trim_end_matches('/')
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable_domain() {
        let site = Site::parse("https://www.example.co.uk/").unwrap();
        assert_eq!(site.hostname(), "www.example.co.uk");
        assert_eq!(site.domain(), "example.co.uk");
        assert_eq!(site.origin_str(), "https://www.example.co.uk");
    }

    #[test]
    fn test_plain_domain() {
        let site = Site::parse(" https://Blog.Example.com/posts ").unwrap();
        assert_eq!(site.hostname(), "blog.example.com");
        assert_eq!(site.domain(), "example.com");
        assert_eq!(site.origin_str(), "https://blog.example.com/posts");
    }

    #[test]
    fn test_ip_host_is_its_own_domain() {
        let site = Site::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(site.domain(), "127.0.0.1");
    }

    #[test]
    fn test_ipv6_host_keeps_its_brackets() {
        let site = Site::parse("http://[::1]:8080/").unwrap();
        assert_eq!(site.hostname(), "[::1]");
        assert_eq!(site.domain(), "[::1]");
    }

    #[test]
    fn test_rejects_non_http() {
        assert!(Site::parse("ftp://example.com").is_err());
        assert!(Site::parse("not a url").is_err());
    }
}
