// src/crawl/coordinator.rs
// =============================================================================
// The crawl coordinator: wires fetched bodies back into the crawl.
//
// Two queues feed it:
// - the page queue: in-scope URLs, parsed as HTML
// - the asset queue: .js / .json / .xml / .map URLs from any host, run
//   through LinkFinder
//
// Data flow for one response:
//
//   fetch -> extract -> dedup -> emit
//                            \-> page queue   (in-scope page URLs)
//                            \-> asset queue  (script / data URLs)
//
// Page fetches carry the operator's cookie and headers; asset fetches go
// through a separate bare Fetcher because assets may live on any host.
//
// Every spawned fetch task holds an Arc to the shared state and runs the
// response handlers itself, so handlers must be safe to run concurrently.
// The only shared mutable state is the DedupRegistry, the queues' own
// bookkeeping and the output sink, each guarded internally.
// =============================================================================

use super::queue::{CrawlTask, Limits, Queue, QueueKind};
use crate::config::ConfigError;
use crate::dedup::DedupRegistry;
use crate::discovery::{unminified, AssetKind, Category, Discovery};
use crate::extract::{decode_body, find_buckets, find_links, parse_page, resolve, SubdomainFinder};
use crate::fetch::{FetchOutcome, Fetchers};
use crate::output::Sink;
use crate::scope::ScopeFilter;
use crate::site::Site;
use std::sync::Arc;
use url::Url;

/// Handle to one site's crawl. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Coordinator {
    shared: Arc<Shared>,
}

struct Shared {
    site: Site,
    scope: ScopeFilter,
    subdomains: SubdomainFinder,
    registry: DedupRegistry,
    fetchers: Fetchers,
    sink: Arc<dyn Sink>,
    pages: Queue,
    assets: Queue,
}

impl Coordinator {
    pub fn new(
        site: Site,
        scope: ScopeFilter,
        fetchers: Fetchers,
        sink: Arc<dyn Sink>,
        limits: Limits,
    ) -> Result<Self, ConfigError> {
        let subdomains = SubdomainFinder::new(site.domain())?;
        Ok(Coordinator {
            shared: Arc::new(Shared {
                site,
                scope,
                subdomains,
                registry: DedupRegistry::new(),
                fetchers,
                sink,
                pages: Queue::new(QueueKind::Page, limits.clone()),
                assets: Queue::new(QueueKind::Asset, limits),
            }),
        })
    }

    pub fn site(&self) -> &Site {
        &self.shared.site
    }

    /// Fetches a seed file (robots.txt, a sitemap) with the page fetcher,
    /// under the page queue's concurrency and delay limits
    pub async fn fetch_seed(&self, url: &Url) -> FetchOutcome {
        let _permit = self.shared.pages.throttle().await;
        self.shared.fetchers.pages.fetch(url).await
    }

    #[cfg(test)]
    pub fn registry(&self) -> &DedupRegistry {
        &self.shared.registry
    }

    /// Queues the site origin as the first page (depth 1)
    pub fn start(&self) {
        let origin = self.shared.site.origin().clone();
        if !self.shared.scope.in_scope(origin.as_str()) {
            tracing::warn!(url = %origin, "site origin is out of scope, nothing will be crawled");
        }
        self.shared.visit_page(origin, 1);
    }

    /// Submits a URL to the page queue (scope-checked). Returns false when
    /// the URL does not parse.
    pub fn visit(&self, url: &str, depth: usize) -> bool {
        match Url::parse(url.trim()) {
            Ok(url) => {
                self.shared.visit_page(url, depth);
                true
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "not a crawlable URL");
                false
            }
        }
    }

    /// Emits a discovery unless its (category, value) was already emitted.
    /// Returns true when it was new.
    pub fn emit(&self, discovery: Discovery) -> bool {
        self.shared.emit(discovery)
    }

    /// Resolves once both queues are idle at the same time.
    ///
    /// Asset responses can feed the page queue and pages feed the asset
    /// queue, so one idle queue is not enough: loop until neither has work.
    pub async fn wait(&self) {
        let shared = &self.shared;
        loop {
            shared.pages.wait_idle().await;
            shared.assets.wait_idle().await;
            if shared.pages.is_idle() && shared.assets.is_idle() {
                return;
            }
        }
    }
}

impl Shared {
    fn emit(&self, discovery: Discovery) -> bool {
        if self.registry.duplicate(discovery.category, &discovery.value) {
            return false;
        }
        self.sink.emit(&discovery);
        true
    }

    fn queue(&self, kind: QueueKind) -> &Queue {
        match kind {
            QueueKind::Page => &self.pages,
            QueueKind::Asset => &self.assets,
        }
    }

    fn visit_page(self: &Arc<Self>, url: Url, depth: usize) {
        if !self.scope.in_scope(url.as_str()) {
            tracing::debug!(url = %url, "out of scope");
            return;
        }
        if let Some(task) = self.pages.admit(url, depth) {
            self.spawn(task);
        }
    }

    /// Submits a script/data URL, plus its non-minified twin, to the asset
    /// queue. Hosts are not scope-checked here.
    fn submit_asset(self: &Arc<Self>, url: Url, depth: usize) {
        if let Some(original) = unminified(&url) {
            if let Some(task) = self.assets.admit(original, depth) {
                self.spawn(task);
            }
        }
        if let Some(task) = self.assets.admit(url, depth) {
            self.spawn(task);
        }
    }

    fn spawn(self: &Arc<Self>, task: CrawlTask) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let queue = shared.queue(task.queue);
            let _pending = queue.pending();

            let outcome = {
                let _permit = queue.throttle().await;
                let fetcher = match task.queue {
                    QueueKind::Page => &shared.fetchers.pages,
                    QueueKind::Asset => &shared.fetchers.assets,
                };
                fetcher.fetch(&task.url).await
            };

            match (task.queue, outcome) {
                (QueueKind::Page, FetchOutcome::Response { url, status, body }) => {
                    shared.on_page(&task, &url, status, &body)
                }
                (QueueKind::Asset, FetchOutcome::Response { url, status, body }) => {
                    shared.on_asset(&task, &url, status, &body)
                }
                (QueueKind::Page, FetchOutcome::Error { url, status, message }) => {
                    shared.on_page_error(&url, status, &message)
                }
                (QueueKind::Asset, FetchOutcome::Error { url, status, message }) => {
                    tracing::debug!(url = %url, status, error = %message, "asset fetch failed");
                }
            }
        });
    }

    fn on_page(self: &Arc<Self>, task: &CrawlTask, url: &Url, status: u16, body: &str) {
        let decoded = decode_body(body);
        let length = decoded.len();
        if self.scope.suppresses_length(length) {
            tracing::debug!(url = %url, length, "response length filtered");
            return;
        }

        self.emit(
            Discovery::new(Category::Url, url.as_str(), task.url.as_str())
                .with_status(status)
                .with_length(length),
        );
        self.report_findings(&decoded, url);

        let page = parse_page(body);

        for href in &page.hrefs {
            let Some(target) = resolve(url, href) else { continue };
            if self.emit(Discovery::new(Category::Href, target.as_str(), url.as_str())) {
                self.visit_page(target, task.depth + 1);
            }
        }

        for action in &page.forms {
            let Some(target) = resolve(url, action) else { continue };
            if self.scope.in_scope(target.as_str()) {
                self.emit(Discovery::new(Category::Form, target.as_str(), url.as_str()));
            }
        }

        if page.has_upload {
            self.emit(Discovery::new(Category::UploadForm, url.as_str(), url.as_str()));
        }

        for src in &page.sources {
            let Some(target) = resolve(url, src) else { continue };
            if AssetKind::from_src(&target).is_none() {
                continue;
            }
            if self.emit(Discovery::new(Category::Javascript, target.as_str(), url.as_str())) {
                self.submit_asset(target, task.depth);
            }
        }
    }

    fn on_asset(self: &Arc<Self>, task: &CrawlTask, url: &Url, status: u16, body: &str) {
        if status != 200 {
            tracing::debug!(url = %url, status, "asset ignored");
            return;
        }
        let decoded = decode_body(body);
        if self.scope.suppresses_length(decoded.len()) {
            tracing::debug!(url = %url, length = decoded.len(), "response length filtered");
            return;
        }

        self.report_findings(&decoded, url);

        for link in find_links(&decoded) {
            // Path-local and site-root resolution are both tried; either may
            // be the real target
            let local = url.join(&link).ok();
            let rooted = self.site.origin().join(&link).ok();
            for target in local.into_iter().chain(rooted) {
                self.follow_link(target, url, task.depth);
            }
        }
    }

    fn follow_link(self: &Arc<Self>, target: Url, source: &Url, depth: usize) {
        if !matches!(target.scheme(), "http" | "https") {
            return;
        }
        if AssetKind::of(&target).is_some() {
            self.submit_asset(target, depth);
            return;
        }
        if !self.scope.in_scope(target.as_str()) {
            return;
        }
        if self.emit(Discovery::new(Category::Linkfinder, target.as_str(), source.as_str())) {
            self.visit_page(target, depth + 1);
        }
    }

    fn on_page_error(&self, url: &Url, status: u16, message: &str) {
        if is_expected_noise(status) {
            tracing::debug!(url = %url, status, error = %message, "fetch failed");
            return;
        }
        self.emit(Discovery::new(Category::Url, url.as_str(), url.as_str()).with_status(status));
    }

    fn report_findings(&self, decoded: &str, source: &Url) {
        for subdomain in self.subdomains.find(decoded) {
            self.emit(Discovery::new(Category::Subdomain, subdomain, source.as_str()));
        }
        for bucket in find_buckets(decoded) {
            self.emit(Discovery::new(Category::Bucket, bucket, source.as_str()));
        }
    }
}

/// Statuses that are never reported: no response at all (0), not found,
/// rate limited, and anything outside [100, 500)
fn is_expected_noise(status: u16) -> bool {
    matches!(status, 0 | 404 | 429) || !(100..500).contains(&status)
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `self: &Arc<Self>` on some methods?
//    - spawn() needs an owned Arc to move into the new task
//    - Taking `&Arc<Self>` lets the method clone that Arc instead of `self`
//
// 2. Why is the permit inside its own block in spawn()?
//    - The block ends right after the fetch, which drops the permit
//    - The next request can start while this response is still being parsed
//
// 3. Why does emit() return a bool?
//    - true means "first time seen"
//    - Callers only queue a URL when they were the first to report it, so
//      two tasks never fetch the same link twice
//
// 4. What is `let ... else`?
//    - `let Some(target) = resolve(..) else { continue };` binds on success
//      and runs the else block otherwise
//    - It keeps the happy path unindented
// -----------------------------------------------------------------------------
