// src/crawl/mod.rs
// =============================================================================
// This module runs the crawl for one site.
//
// Features:
// - Two queues: in-scope pages, and script / data assets from any host
// - Depth limit, parallelism limit and politeness delay per queue
// - Seeding from robots.txt, well-known sitemaps and third-party archives
// - Every finding is de-duplicated before it reaches the output
//
// Layout:
// - queue:       scheduling (visited set, depth, semaphore, idle wait)
// - coordinator: turns fetched bodies into discoveries and new tasks
// - robots / sitemap: seeders that feed URLs into the coordinator
// - session:     runs the seeders and waits for the crawl to finish
//
// Rust concepts:
// - Arc: every spawned fetch task shares the coordinator's state
// - Async programming: fetches, seeders and providers all run concurrently
// =============================================================================

mod coordinator;
mod queue;
mod robots;
mod sitemap;
mod session;

pub use coordinator::Coordinator;
pub use queue::Limits;
pub use session::{run_session, OtherSources, Seeds};
