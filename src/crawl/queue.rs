// src/crawl/queue.rs
// =============================================================================
// Scheduling for one crawl queue (pages or assets).
//
// A Queue decides whether a URL may be fetched and paces the fetches:
// - depth: tasks deeper than the configured limit are dropped (0 = no limit)
// - visited: a URL is fetched at most once per queue per session
// - parallelism: at most N fetches in flight (tokio Semaphore)
// - politeness: a fixed delay plus random jitter before every request
//
// It also tracks how many admitted tasks are still pending, so the session
// can wait until the queue has gone idle.
//
// Rust concepts:
// - AtomicUsize: a counter many tasks can change without a lock
// - Notify: wakes up tasks waiting for the pending count to reach zero
// - RAII guard: `Pending` marks the task finished when dropped, even if the
//   response handler panics
// =============================================================================

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore, SemaphorePermit};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// In-scope HTML traversal
    Page,
    /// Script / data bodies, fetched from any host
    Asset,
}

/// A URL admitted to a queue, waiting to be fetched
#[derive(Debug, Clone)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: usize,
    pub queue: QueueKind,
}

/// Pacing knobs shared by both queues
#[derive(Debug, Clone)]
pub struct Limits {
    pub parallelism: usize,
    pub delay: Duration,
    pub random_delay: Duration,
    /// Deepest depth fetched; the seed is depth 1, 0 disables the limit
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            parallelism: 5,
            delay: Duration::ZERO,
            random_delay: Duration::ZERO,
            max_depth: 1,
        }
    }
}

pub struct Queue {
    kind: QueueKind,
    limits: Limits,
    permits: Semaphore,
    visited: Mutex<HashSet<String>>,
    pending: AtomicUsize,
    idle: Notify,
}

impl Queue {
    pub fn new(kind: QueueKind, limits: Limits) -> Self {
        Queue {
            kind,
            permits: Semaphore::new(limits.parallelism.max(1)),
            limits,
            visited: Mutex::new(HashSet::new()),
            pending: AtomicUsize::new(0),
            idle: Notify::new(),
        }
    }

    /// Admits a URL unless it is too deep or was already visited.
    ///
    /// An admitted task counts as pending until its `Pending` guard drops.
    pub fn admit(&self, url: Url, depth: usize) -> Option<CrawlTask> {
        if self.limits.max_depth > 0 && depth > self.limits.max_depth {
            tracing::debug!(url = %url, depth, queue = ?self.kind, "dropped, too deep");
            return None;
        }

        let mut key = url.clone();
        key.set_fragment(None);
        let first_visit = self
            .visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into());
        if !first_visit {
            return None;
        }

        self.pending.fetch_add(1, Ordering::SeqCst);
        Some(CrawlTask {
            url,
            depth,
            queue: self.kind,
        })
    }

    /// Guard for an admitted task; dropping it marks the task finished
    pub fn pending(&self) -> Pending<'_> {
        Pending { queue: self }
    }

    /// Waits for a free slot, then for the politeness delay
    pub async fn throttle(&self) -> Option<SemaphorePermit<'_>> {
        // The semaphore is never closed, so acquire() cannot fail here
        let permit = self.permits.acquire().await.ok();

        let jitter_ms = self.limits.random_delay.as_millis() as u64;
        let delay = self.limits.delay + Duration::from_millis(fastrand::u64(0..=jitter_ms));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        permit
    }

    pub fn is_idle(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }

    /// Resolves once no admitted task is pending
    pub async fn wait_idle(&self) {
        loop {
            // Register interest before checking, so a wake-up between the
            // check and the await is not lost
            let notified = self.idle.notified();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    fn finish(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

pub struct Pending<'a> {
    queue: &'a Queue,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.queue.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_admits_each_url_once() {
        let queue = Queue::new(QueueKind::Page, Limits::default());
        assert!(queue.admit(url("https://a.com/x"), 1).is_some());
        assert!(queue.admit(url("https://a.com/x"), 1).is_none());
        assert!(queue.admit(url("https://a.com/x#frag"), 1).is_none());
        assert!(queue.admit(url("https://a.com/y"), 1).is_some());
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits {
            max_depth: 2,
            ..Default::default()
        };
        let queue = Queue::new(QueueKind::Page, limits);
        assert!(queue.admit(url("https://a.com/1"), 1).is_some());
        assert!(queue.admit(url("https://a.com/2"), 2).is_some());
        assert!(queue.admit(url("https://a.com/3"), 3).is_none());

        let unlimited = Queue::new(
            QueueKind::Page,
            Limits {
                max_depth: 0,
                ..Default::default()
            },
        );
        assert!(unlimited.admit(url("https://a.com/deep"), 50).is_some());
    }

    #[tokio::test]
    async fn test_wait_idle_after_all_tasks_finish() {
        let queue = Arc::new(Queue::new(QueueKind::Asset, Limits::default()));
        assert!(queue.is_idle());

        queue.admit(url("https://a.com/1.js"), 1).unwrap();
        queue.admit(url("https://a.com/2.js"), 1).unwrap();
        assert!(!queue.is_idle());

        let worker = Arc::clone(&queue);
        tokio::spawn(async move {
            for _ in 0..2 {
                let _permit = worker.throttle().await;
                let _done = worker.pending();
                tokio::task::yield_now().await;
            }
        });

        tokio::time::timeout(Duration::from_secs(5), queue.wait_idle())
            .await
            .expect("queue never went idle");
        assert!(queue.is_idle());
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why AtomicUsize and not Mutex<usize> for the pending count?
//    - Every task touches the counter twice (admit and finish)
//    - An atomic add/sub needs no lock, so tasks never wait on each other
//
// 2. Why is `notified()` created before checking `is_idle()`?
//    - notify_waiters() only wakes tasks that are already waiting
//    - Creating the Notified future first registers us, so a finish that
//      happens between the check and the await still wakes us
//
// 3. What does the lifetime in `Pending<'_>` mean?
//    - The guard borrows the Queue it belongs to
//    - It cannot outlive the queue, and the compiler checks that for us
//
// 4. Why does throttle() return the permit?
//    - The slot stays taken for as long as the caller holds the permit
//    - Dropping it (at the end of the fetch block) frees the slot
// -----------------------------------------------------------------------------
