//! Crawl frontier: visited-set membership plus the FIFO queue of pending work
//!
//! The frontier owns the "already seen" decision. Admission (check the
//! visited set, mark the URL, enqueue its [`CrawlItem`]) happens inside a
//! single critical section, so for any normalized URL exactly one concurrent
//! caller wins and exactly one item is ever created.
//!
//! It also owns the page budget: units reserve a [`PageSlot`] before saving
//! and commit it afterwards, so `crawled <= reserved <= max_pages` holds at
//! every instant.

use crate::config::CrawlerConfig;
use crate::url::{extract_domain, is_same_domain, normalize_url};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// A unit of pending or in-flight work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlItem {
    /// Normalized URL to fetch
    pub url: String,

    /// Link distance from the root URL
    pub depth: u32,
}

/// One claimed unit of the page budget
///
/// Dropping the slot without [`commit`](PageSlot::commit) returns it to the
/// budget, including when the holding unit fails, panics or is aborted.
#[must_use = "an uncommitted slot is released immediately"]
#[derive(Debug)]
pub struct PageSlot<'a> {
    frontier: &'a Frontier,
    committed: bool,
}

impl PageSlot<'_> {
    /// Counts the page as crawled and keeps the slot
    ///
    /// # Returns
    ///
    /// The new crawled count, or `None` if the frontier is closed
    pub fn commit(mut self) -> Option<usize> {
        self.committed = true;
        self.frontier.record_completion()
    }
}

impl Drop for PageSlot<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.frontier.release_page();
        }
    }
}

/// State guarded by the frontier mutex
#[derive(Debug, Default)]
struct FrontierState {
    visited: HashSet<String>,
    pending: VecDeque<CrawlItem>,
    closed: bool,
}

/// Thread-safe crawl frontier
///
/// Shared between the scheduler and every worker behind an `Arc`. No lock is
/// held across an `.await`.
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    root_domain: String,
    stay_in_domain: bool,
    max_pages: usize,

    /// Pages fetched and saved
    crawled: AtomicUsize,

    /// Page slots claimed by units that are saving or have saved
    reserved: AtomicUsize,

    /// Signalled on admission and on unit completion
    changed: Notify,
}

impl Frontier {
    /// Creates an empty frontier for a crawl rooted at `root_url`
    ///
    /// # Arguments
    ///
    /// * `root_url` - The crawl's root URL; its host becomes the root domain
    /// * `stay_in_domain` - Only admit URLs on the root domain
    /// * `max_pages` - Page budget (completed pages)
    pub fn new(root_url: &str, stay_in_domain: bool, max_pages: usize) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            root_domain: extract_domain(root_url),
            stay_in_domain,
            max_pages,
            crawled: AtomicUsize::new(0),
            reserved: AtomicUsize::new(0),
            changed: Notify::new(),
        }
    }

    /// Creates a frontier from the crawler section of the configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(&config.root_url, config.stay_in_domain, config.max_pages)
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // Critical sections never panic midway, so a poisoned lock still
        // guards consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits a URL at the given depth if it has not been seen before
    ///
    /// The URL is normalized, checked against the domain restriction, and
    /// then, atomically, marked visited and enqueued.
    ///
    /// # Returns
    ///
    /// `true` if this call admitted the URL; `false` if it was empty, outside
    /// the allowed domain, already visited, or the frontier is closed.
    pub fn admit(&self, url: &str, depth: u32) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }

        let normalized = normalize_url(url);
        if normalized.is_empty() {
            return false;
        }

        if self.stay_in_domain && !is_same_domain(&normalized, &self.root_domain) {
            tracing::trace!("Rejected off-domain URL: {}", normalized);
            return false;
        }

        let admitted = {
            let mut state = self.lock();
            if state.closed || state.visited.contains(&normalized) {
                false
            } else {
                state.visited.insert(normalized.clone());
                state.pending.push_back(CrawlItem {
                    url: normalized,
                    depth,
                });
                true
            }
        };

        if admitted {
            self.changed.notify_one();
        }
        admitted
    }

    /// Pops the oldest pending item
    pub fn take_next(&self) -> Option<CrawlItem> {
        self.lock().pending.pop_front()
    }

    /// Returns whether any item is waiting for a worker
    pub fn has_pending(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Claims one page slot from the budget
    ///
    /// Units call this after a successful fetch and before saving. Returns
    /// `None` once `max_pages` slots are claimed or the frontier is closed.
    /// The slot goes back to the budget when dropped uncommitted.
    pub fn reserve_page(&self) -> Option<PageSlot<'_>> {
        let state = self.lock();
        if state.closed {
            return None;
        }

        self.reserved
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max_pages).then_some(n + 1)
            })
            .ok()
            .map(|_| PageSlot {
                frontier: self,
                committed: false,
            })
    }

    fn release_page(&self) {
        let _ = self
            .reserved
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        self.changed.notify_one();
    }

    /// Records a page that was fetched and saved
    ///
    /// Returns the new crawled count, or `None` if the frontier is closed.
    fn record_completion(&self) -> Option<usize> {
        let state = self.lock();
        if state.closed {
            return None;
        }
        let count = self.crawled.fetch_add(1, Ordering::SeqCst) + 1;
        drop(state);

        self.changed.notify_one();
        Some(count)
    }

    /// Closes the frontier
    ///
    /// After this returns, `admit`, `reserve_page` and `PageSlot::commit`
    /// have no effect. Calling it again is a no-op.
    pub fn close(&self) {
        let mut state = self.lock();
        if !state.closed {
            state.closed = true;
            tracing::debug!("Frontier closed with {} pending items", state.pending.len());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of pages fetched and saved
    pub fn crawled_count(&self) -> usize {
        self.crawled.load(Ordering::SeqCst)
    }

    /// Number of distinct normalized URLs ever admitted
    pub fn discovered_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Returns true once completed pages reach the budget
    pub fn page_budget_reached(&self) -> bool {
        self.crawled_count() >= self.max_pages
    }

    /// Returns true while every remaining page slot is claimed
    pub fn page_slots_exhausted(&self) -> bool {
        self.reserved.load(Ordering::SeqCst) >= self.max_pages
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Wakes whoever is waiting in [`changed`](Self::changed)
    pub(crate) fn wake(&self) {
        self.changed.notify_one();
    }

    /// Resolves after the next admission or unit completion
    ///
    /// A signal raised while nobody was waiting is kept, so a change between
    /// checking the frontier and calling this is never missed.
    pub async fn changed(&self) {
        self.changed.notified().await;
    }
}
