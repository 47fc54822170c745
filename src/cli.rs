// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There are no subcommands: one invocation crawls one site (--site) or a
// list of sites (--sites), and every other flag tunes that crawl.
//
// Flags fall into groups:
// - input / output:  --site, --sites, --output, --json, --quiet, --length
// - requests:        --proxy, --user-agent, --cookie, --header, --burp,
//                    --timeout, --no-redirect
// - scope:           --whitelist, --whitelist-domain, --blacklist, --subs,
//                    --filter-length
// - pacing:          --threads, --concurrent, --depth, --delay, --random-delay
// - seeders:         --robots, --sitemap, --other-source, --include-subs,
//                    --include-other-source
//
// Everything here is raw user input. Validation (regex compilation, header
// syntax, reading the site list) happens in config.rs.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "scope-spider",
    version,
    about = "A fast web spider for content discovery",
    long_about = "scope-spider crawls a site and reports every URL, form, script, subdomain and \
                  S3 bucket it can find. It can also seed the crawl from robots.txt, sitemaps \
                  and public URL archives."
)]
pub struct Cli {
    /// Site to crawl (e.g., https://example.com)
    #[arg(short = 's', long)]
    pub site: Option<String>,

    /// File with one site per line
    #[arg(short = 'S', long = "sites")]
    pub sites: Option<PathBuf>,

    /// Proxy for every request (e.g., http://127.0.0.1:8080)
    #[arg(short = 'p', long)]
    pub proxy: Option<String>,

    /// Folder to write one output file per site into
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// User agent: "web" (random desktop), "mobi" (random mobile) or a literal string
    #[arg(short = 'u', long = "user-agent", default_value = "web")]
    pub user_agent: String,

    /// Cookie header sent with every request (e.g., "session=abc; theme=dark")
    #[arg(long)]
    pub cookie: Option<String>,

    /// Extra request header, "Name: value". Repeat for more than one
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Raw HTTP request saved from Burp; its headers and cookie replace
    /// --header and --cookie
    #[arg(long)]
    pub burp: Option<PathBuf>,

    /// Regex of URLs never to crawl
    #[arg(long)]
    pub blacklist: Option<String>,

    /// Regex of URLs to crawl; replaces the default host scope
    #[arg(long)]
    pub whitelist: Option<String>,

    /// Domain to crawl, including its subdomains
    #[arg(long = "whitelist-domain")]
    pub whitelist_domain: Option<String>,

    /// Response lengths to ignore, comma separated (e.g., 0,1274)
    #[arg(short = 'L', long = "filter-length")]
    pub filter_length: Option<String>,

    /// Number of sites crawled at the same time
    #[arg(short = 't', long, default_value_t = 1)]
    pub threads: usize,

    /// Maximum concurrent requests per queue
    #[arg(short = 'c', long, default_value_t = 5)]
    pub concurrent: usize,

    /// Maximum crawl depth; 0 means no limit
    ///
    /// Depth 1 = just the starting page
    /// Depth 2 = starting page + all pages it links to
    #[arg(short = 'd', long, default_value_t = 1)]
    pub depth: usize,

    /// Delay before each request, in seconds
    #[arg(short = 'k', long, default_value_t = 0)]
    pub delay: u64,

    /// Extra random delay added to --delay, in seconds
    #[arg(short = 'K', long = "random-delay", default_value_t = 0)]
    pub random_delay: u64,

    /// Request timeout in seconds
    #[arg(short = 'm', long, default_value_t = 10)]
    pub timeout: u64,

    /// Try well-known sitemap locations
    #[arg(long)]
    pub sitemap: bool,

    /// Seed the crawl from robots.txt (--robots false to turn off)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub robots: bool,

    /// Ask third-party archives (Wayback, Common Crawl, OTX, VirusTotal) for URLs
    #[arg(short = 'a', long = "other-source")]
    pub other_source: bool,

    /// Ask the third-party archives for subdomain URLs too
    #[arg(short = 'w', long = "include-subs")]
    pub include_subs: bool,

    /// Crawl the URLs the third-party archives report as well
    #[arg(short = 'r', long = "include-other-source")]
    pub include_other_source: bool,

    /// Crawl subdomains of the site as well
    #[arg(long)]
    pub subs: bool,

    /// One JSON object per line
    #[arg(long)]
    pub json: bool,

    /// Print bare values only
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Show response lengths
    #[arg(short = 'l', long)]
    pub length: bool,

    /// Do not follow redirects
    #[arg(long = "no-redirect")]
    pub no_redirect: bool,

    /// Log progress to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Log everything to stderr
    #[arg(long)]
    pub debug: bool,
}
