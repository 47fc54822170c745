// src/config.rs
// =============================================================================
// Turns raw command-line input into a validated crawl configuration.
//
// Everything that can be wrong with the user's input is caught here, before
// any request is sent:
// - no site given, or an unreadable --sites file
// - a --whitelist / --blacklist that is not a valid regex
// - a --header without "Name: value" syntax
// - a --burp request file that cannot be read or has no header block
// - a --filter-length entry that is not a number
// - an --output folder that cannot be created
//
// A ConfigError is fatal: main prints it and exits with code 2. A single bad
// entry in the site list is not a ConfigError; it is logged and skipped when
// its turn comes.
// =============================================================================

use crate::cli::Cli;
use crate::crawl::Limits;
use crate::fetch::{FetchSettings, UserAgent};
use crate::output::Format;
use crate::scope::{self, ScopeRules};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no site to crawl; use --site or --sites")]
    NoSites,

    #[error("cannot read site list {}: {source}", path.display())]
    SiteList {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid site '{input}': {reason}")]
    InvalidSite { input: String, reason: String },

    #[error("invalid {name} pattern '{pattern}': {source}")]
    Pattern {
        name: &'static str,
        pattern: String,
        source: regex::Error,
    },

    #[error("invalid header '{0}', expected 'Name: value'")]
    Header(String),

    #[error("cannot read burp request {}: {source}", path.display())]
    BurpFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid burp request {}: {reason}", path.display())]
    BurpRequest { path: PathBuf, reason: String },

    #[error("invalid filter length '{0}'")]
    FilterLength(String),

    #[error("invalid proxy '{proxy}': {source}")]
    Proxy {
        proxy: String,
        source: reqwest::Error,
    },

    #[error("cannot write output to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// Validated settings shared by every site in the run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Raw site inputs, in order; each is parsed when a worker picks it up
    pub sites: Vec<String>,
    pub threads: usize,
    pub limits: Limits,
    pub fetch: FetchSettings,
    pub scope: ScopeRules,
    pub format: Format,
    pub output_dir: Option<PathBuf>,
    pub robots: bool,
    pub sitemap: bool,
    pub other_sources: bool,
    pub include_subs: bool,
    pub include_other_sources: bool,
}

impl CrawlConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let sites = collect_sites(cli)?;

        let scope = ScopeRules {
            whitelist: cli
                .whitelist
                .as_deref()
                .map(|p| scope::compile("whitelist", p))
                .transpose()?,
            whitelist_domain: cli
                .whitelist_domain
                .as_deref()
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty()),
            blacklist: cli
                .blacklist
                .as_deref()
                .map(|p| scope::compile("blacklist", p))
                .transpose()?,
            include_subdomains: cli.subs,
            filter_lengths: parse_lengths(cli.filter_length.as_deref().unwrap_or(""))?,
        };

        // A burp request replaces --header and --cookie entirely
        let credentials = match &cli.burp {
            Some(path) => load_burp_request(path)?,
            None => BurpRequest {
                headers: cli
                    .headers
                    .iter()
                    .map(|h| parse_header(h))
                    .collect::<Result<_, _>>()?,
                cookie: cli.cookie.clone(),
            },
        };

        let fetch = FetchSettings {
            timeout: Duration::from_secs(cli.timeout),
            proxy: cli.proxy.clone().filter(|p| !p.trim().is_empty()),
            user_agent: UserAgent::parse(&cli.user_agent),
            headers: credentials.headers,
            cookie: credentials.cookie.filter(|c| !c.trim().is_empty()),
            follow_redirects: !cli.no_redirect,
        };

        let limits = Limits {
            parallelism: cli.concurrent.max(1),
            delay: Duration::from_secs(cli.delay),
            random_delay: Duration::from_secs(cli.random_delay),
            max_depth: cli.depth,
        };

        let format = if cli.json {
            Format::Json
        } else if cli.quiet {
            Format::Quiet
        } else {
            Format::Plain {
                show_length: cli.length,
            }
        };

        let output_dir = match &cli.output {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|source| ConfigError::Output {
                    path: dir.clone(),
                    source,
                })?;
                Some(dir.clone())
            }
            None => None,
        };

        Ok(CrawlConfig {
            sites,
            threads: cli.threads.max(1),
            limits,
            fetch,
            scope,
            format,
            output_dir,
            robots: cli.robots,
            sitemap: cli.sitemap,
            other_sources: cli.other_source,
            include_subs: cli.include_subs,
            include_other_sources: cli.include_other_source,
        })
    }
}

// --site first, then the --sites file, blank lines skipped
fn collect_sites(cli: &Cli) -> Result<Vec<String>, ConfigError> {
    let mut sites = Vec::new();
    if let Some(site) = &cli.site {
        if !site.trim().is_empty() {
            sites.push(site.trim().to_string());
        }
    }
    if let Some(path) = &cli.sites {
        let list = fs::read_to_string(path).map_err(|source| ConfigError::SiteList {
            path: path.clone(),
            source,
        })?;
        sites.extend(
            list.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }
    if sites.is_empty() {
        return Err(ConfigError::NoSites);
    }
    Ok(sites)
}

/// Splits "Name: value" at the first colon
pub fn parse_header(raw: &str) -> Result<(String, String), ConfigError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| ConfigError::Header(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::Header(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Headers and cookie taken from a raw HTTP request
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BurpRequest {
    pub headers: Vec<(String, String)>,
    pub cookie: Option<String>,
}

fn load_burp_request(path: &Path) -> Result<BurpRequest, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::BurpFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_burp_request(&raw).map_err(|reason| ConfigError::BurpRequest {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parses a request as saved by Burp ("Copy to file"): the request line,
/// then header lines up to the first blank line. The body is ignored.
///
/// `Cookie` becomes the cookie. `Host` and `Content-Length` are dropped:
/// the crawl sets its own host and sends no body.
pub fn parse_burp_request(raw: &str) -> Result<BurpRequest, String> {
    let mut lines = raw.lines();
    let request_line = lines.next().map(str::trim).unwrap_or("");
    if request_line.split_whitespace().count() < 2 {
        return Err(format!("malformed request line '{}'", request_line));
    }

    let mut request = BurpRequest::default();
    let mut cookies = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let (name, value) = parse_header(line).map_err(|e| e.to_string())?;
        if name.eq_ignore_ascii_case("cookie") {
            cookies.push(value);
        } else if !name.eq_ignore_ascii_case("host") && !name.eq_ignore_ascii_case("content-length") {
            request.headers.push((name, value));
        }
    }
    if !cookies.is_empty() {
        request.cookie = Some(cookies.join("; "));
    }
    Ok(request)
}

/// Parses "0,1274, 512" into lengths; empty input means no filter
pub fn parse_lengths(raw: &str) -> Result<Vec<usize>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|_| ConfigError::FilterLength(s.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("scope-spider").chain(args.iter().copied()))
    }

    #[test]
    fn test_minimal_config() {
        let config = CrawlConfig::from_cli(&cli(&["-s", "https://example.com"])).unwrap();
        assert_eq!(config.sites, vec!["https://example.com"]);
        assert_eq!(config.threads, 1);
        assert_eq!(config.limits.max_depth, 1);
        assert_eq!(config.limits.parallelism, 5);
        assert_eq!(config.format, Format::Plain { show_length: false });
        assert!(config.fetch.follow_redirects);
        assert!(config.robots);
        assert!(config.scope.whitelist.is_none());
    }

    #[test]
    fn test_no_sites() {
        assert!(matches!(CrawlConfig::from_cli(&cli(&[])), Err(ConfigError::NoSites)));
    }

    #[test]
    fn test_sites_file() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("sites.txt");
        fs::write(&list, "https://a.com\n\n  https://b.com  \n").unwrap();

        let args = ["-s", "https://first.com", "-S", list.to_str().unwrap()];
        let config = CrawlConfig::from_cli(&cli(&args)).unwrap();
        assert_eq!(config.sites, vec!["https://first.com", "https://a.com", "https://b.com"]);

        let missing = dir.path().join("nope.txt");
        let result = CrawlConfig::from_cli(&cli(&["-S", missing.to_str().unwrap()]));
        assert!(matches!(result, Err(ConfigError::SiteList { .. })));
    }

    #[test]
    fn test_bad_regex_is_fatal() {
        let result = CrawlConfig::from_cli(&cli(&["-s", "https://a.com", "--blacklist", "(unclosed"]));
        assert!(matches!(result, Err(ConfigError::Pattern { name: "blacklist", .. })));
    }

    #[test]
    fn test_headers() {
        assert_eq!(
            parse_header("Authorization: Bearer a:b").unwrap(),
            ("Authorization".to_string(), "Bearer a:b".to_string())
        );
        assert!(matches!(parse_header("no colon"), Err(ConfigError::Header(_))));
        assert!(matches!(parse_header(": value"), Err(ConfigError::Header(_))));
    }

    const BURP: &str = "GET /account?tab=1 HTTP/1.1\r\n\
                        Host: example.com\r\n\
                        User-Agent: Mozilla/5.0\r\n\
                        Cookie: session=abc; theme=dark\r\n\
                        Authorization: Bearer t0k3n\r\n\
                        Content-Length: 7\r\n\
                        \r\n\
                        a=b&c=d";

    #[test]
    fn test_burp_request() {
        let request = parse_burp_request(BURP).unwrap();
        assert_eq!(request.cookie.as_deref(), Some("session=abc; theme=dark"));
        assert_eq!(
            request.headers,
            vec![
                ("User-Agent".to_string(), "Mozilla/5.0".to_string()),
                ("Authorization".to_string(), "Bearer t0k3n".to_string()),
            ]
        );
    }

    #[test]
    fn test_burp_request_errors() {
        assert!(parse_burp_request("").is_err());
        assert!(parse_burp_request("GET\n").is_err());
        assert!(parse_burp_request("GET / HTTP/1.1\nnot a header\n").is_err());
        // No headers at all is fine
        assert_eq!(parse_burp_request("GET / HTTP/1.1\n").unwrap(), BurpRequest::default());
    }

    #[test]
    fn test_burp_file_replaces_header_and_cookie_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.txt");
        fs::write(&path, BURP).unwrap();

        let args = [
            "-s", "https://example.com", "--burp", path.to_str().unwrap(),
            "--cookie", "ignored=1", "-H", "X-Ignored: 1",
        ];
        let config = CrawlConfig::from_cli(&cli(&args)).unwrap();
        assert_eq!(config.fetch.cookie.as_deref(), Some("session=abc; theme=dark"));
        assert_eq!(config.fetch.headers.len(), 2);
        assert!(!config.fetch.headers.iter().any(|(name, _)| name == "X-Ignored"));

        let missing = dir.path().join("nope.txt");
        let result = CrawlConfig::from_cli(&cli(&["-s", "https://a.com", "--burp", missing.to_str().unwrap()]));
        assert!(matches!(result, Err(ConfigError::BurpFile { .. })));

        fs::write(&path, "garbage").unwrap();
        let result = CrawlConfig::from_cli(&cli(&["-s", "https://a.com", "--burp", path.to_str().unwrap()]));
        assert!(matches!(result, Err(ConfigError::BurpRequest { .. })));
    }

    #[test]
    fn test_lengths() {
        assert_eq!(parse_lengths("0, 1274,512").unwrap(), vec![0, 1274, 512]);
        assert!(parse_lengths("").unwrap().is_empty());
        assert!(matches!(parse_lengths("12,abc"), Err(ConfigError::FilterLength(_))));
    }

    #[test]
    fn test_output_folder_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        let config = CrawlConfig::from_cli(&cli(&["-s", "https://a.com", "-o", out.to_str().unwrap()])).unwrap();
        assert!(out.is_dir());
        assert_eq!(config.output_dir, Some(out));
    }

    #[test]
    fn test_output_format_precedence() {
        let config = CrawlConfig::from_cli(&cli(&["-s", "https://a.com", "--json", "-q"])).unwrap();
        assert_eq!(config.format, Format::Json);
        let config = CrawlConfig::from_cli(&cli(&["-s", "https://a.com", "-q", "-l"])).unwrap();
        assert_eq!(config.format, Format::Quiet);
    }
}
