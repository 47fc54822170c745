// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Validate them into a CrawlConfig (fatal errors exit with code 2)
// 3. Start --threads site workers that pull sites from a shared channel
// 4. Each worker runs one full crawl session per site
//
// Discoveries go to stdout (and the optional output folder); logs go to
// stderr, so the output can be piped into other tools.
//
// Rust concepts used:
// - async/await: every request, seeder and provider runs concurrently
// - Arc: the config, fetchers and aggregator are shared by all workers
// - mpsc + Mutex: workers take turns pulling the next site off one channel
// =============================================================================

// Module declarations - tells Rust about our other source files
mod aggregate; // src/aggregate/ - third-party URL sources
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validation of the command line
mod crawl; // src/crawl/ - queues, coordinator, seeders
mod dedup; // src/dedup.rs - per-category "already reported" sets
mod discovery; // src/discovery.rs - what the crawl reports
mod extract; // src/extract/ - pulling links and names out of bodies
mod fetch; // src/fetch/ - the HTTP boundary
mod output; // src/output.rs - rendering and writing discoveries
mod scope; // src/scope.rs - which URLs may be crawled
mod site; // src/site.rs - a parsed crawl target

use aggregate::Aggregator;
use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::{ConfigError, CrawlConfig};
use crawl::{run_session, Coordinator, OtherSources, Seeds};
use fetch::{FetchSettings, Fetchers};
use output::Output;
use reqwest::{Client, Proxy};
use scope::ScopeFilter;
use site::Site;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// Archive indexes answer slowly for big domains
const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = Arc::new(CrawlConfig::from_cli(&cli)?);
    let fetchers = Fetchers::from_settings(&config.fetch)?;
    let aggregator = if config.other_sources {
        Some(Arc::new(Aggregator::new(archive_client(&config.fetch)?)))
    } else {
        None
    };

    tracing::info!(sites = config.sites.len(), threads = config.threads, "starting");

    // Workers share one receiver; whoever holds the lock takes the next site
    let (tx, rx) = mpsc::channel::<String>(config.threads);
    let rx = Arc::new(Mutex::new(rx));

    let mut workers = JoinSet::new();
    for _ in 0..config.threads {
        let rx = Arc::clone(&rx);
        let config = Arc::clone(&config);
        let fetchers = fetchers.clone();
        let aggregator = aggregator.clone();

        workers.spawn(async move {
            loop {
                let next = rx.lock().await.recv().await;
                let Some(input) = next else { break };
                if let Err(e) = crawl_site(&input, &config, &fetchers, aggregator.as_ref()).await {
                    tracing::error!(site = %input, error = %e, "skipping site");
                }
            }
        });
    }

    for site in &config.sites {
        if tx.send(site.clone()).await.is_err() {
            break;
        }
    }
    drop(tx);

    while let Some(joined) = workers.join_next().await {
        joined?;
    }
    Ok(())
}

// One full session: parse the site, build its scope and output, crawl
async fn crawl_site(
    input: &str,
    config: &CrawlConfig,
    fetchers: &Fetchers,
    aggregator: Option<&Arc<Aggregator>>,
) -> Result<()> {
    let site = Site::parse(input)?;
    let scope = ScopeFilter::new(&site, &config.scope)?;
    let sink = Arc::new(Output::new(&site, config.format, config.output_dir.as_deref())?);

    let coordinator = Coordinator::new(site, scope, fetchers.clone(), sink, config.limits.clone())?;

    let seeds = Seeds {
        robots: config.robots,
        sitemap: config.sitemap,
        other_sources: aggregator.map(|aggregator| OtherSources {
            aggregator: Arc::clone(aggregator),
            include_subdomains: config.include_subs,
            visit: config.include_other_sources,
        }),
    };

    run_session(coordinator, seeds).await;
    Ok(())
}

// Client for the archive providers: same proxy as the crawl, longer timeout
fn archive_client(settings: &FetchSettings) -> Result<Client, ConfigError> {
    let mut builder = Client::builder().timeout(ARCHIVE_TIMEOUT.max(settings.timeout));
    if let Some(proxy) = &settings.proxy {
        let proxy = Proxy::all(proxy).map_err(|source| ConfigError::Proxy {
            proxy: proxy.clone(),
            source,
        })?;
        builder = builder.proxy(proxy);
    }
    builder.build().map_err(ConfigError::Client)
}

// Logs go to stderr. RUST_LOG wins; otherwise --debug / --verbose pick the
// level for our own crate and everything else stays at warn.
fn init_tracing(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("warn,scope_spider={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
