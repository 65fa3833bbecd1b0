//! Crawl scheduler: seeds the frontier, dispatches units and drains the run
//!
//! The scheduler is the single dispatch loop of a crawl. It:
//! - Validates configuration and seeds the frontier with the root URL
//! - Hands pending items to at most `workers` concurrently running units
//! - Detects termination (page budget, exhausted frontier, shutdown request)
//! - Drains in-flight units within a grace period, then cancels stragglers
//!
//! The loop never busy-waits: when there is nothing to dispatch it sleeps
//! until the frontier signals a change, a shutdown is requested, or the idle
//! backoff elapses.

use crate::config::{validate, Config};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::worker::{CrawlTask, OutcomeTally, UnitContext, UnitOutcome};
use crate::output::{ContentSink, FileContentSink, RunSummary};
use crate::state::{RunPhase, StopReason};
use crate::{CrawlError, Result};
use chrono::Local;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep, timeout};

/// Cloneable handle for asking a running crawl to stop
///
/// A requested shutdown makes the scheduler stop dispatching and drain at its
/// next loop iteration.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            tracing::info!("Shutdown requested, draining in-flight units");
        }
        self.notify.notify_one();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    async fn requested(&self) {
        self.notify.notified().await;
    }
}

/// Tracks one dispatched unit
///
/// Dropped when the unit finishes, panics or is aborted: releases the worker
/// permit, decrements the in-flight count and wakes the scheduler.
struct InFlightGuard {
    permit: Option<OwnedSemaphorePermit>,
    in_flight: Arc<AtomicUsize>,
    frontier: Arc<Frontier>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        // Permit first, so the woken scheduler can dispatch right away
        drop(self.permit.take());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.frontier.wake();
    }
}

/// The crawl scheduler
pub struct Scheduler {
    config: Config,
    frontier: Arc<Frontier>,
    ctx: UnitContext,
    semaphore: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    phase: RunPhase,
    shutdown: ShutdownHandle,
}

impl Scheduler {
    /// Creates a scheduler with explicit collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration; validated before anything else
    /// * `fetcher` - Retrieves pages
    /// * `extractor` - Pulls titles and links out of HTML
    /// * `sink` - Persists saved pages
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - Ready to run, in the `Seeding` phase
    /// * `Err(CrawlError::Config)` - The configuration is invalid
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        sink: Arc<dyn ContentSink>,
    ) -> Result<Self> {
        validate(&config)?;

        let frontier = Arc::new(Frontier::from_config(&config.crawler));
        let ctx = UnitContext {
            frontier: Arc::clone(&frontier),
            fetcher,
            extractor,
            sink,
            max_depth: config.crawler.max_depth,
        };
        let semaphore = Arc::new(Semaphore::new(config.crawler.workers));

        Ok(Self {
            config,
            frontier,
            ctx,
            semaphore,
            in_flight: Arc::new(AtomicUsize::new(0)),
            phase: RunPhase::Seeding,
            shutdown: ShutdownHandle::default(),
        })
    }

    /// Creates a scheduler that fetches over HTTP and writes pages to the
    /// configured output directory
    ///
    /// Configuration is validated before the HTTP client or the output
    /// directory is created.
    pub fn from_config(config: Config) -> Result<Self> {
        validate(&config)?;

        let fetcher = HttpFetcher::new(&config.fetcher)?;
        let sink = FileContentSink::create(&config.output.directory)?;

        Self::new(
            config,
            Arc::new(fetcher),
            Arc::new(HtmlLinkExtractor),
            Arc::new(sink),
        )
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn transition(&mut self, next: RunPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Run phase: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs the crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run terminated; the summary says why
    /// * `Err(CrawlError)` - The run could not be driven through its phases
    pub async fn run(mut self) -> Result<RunSummary> {
        let started_at = Local::now();
        let start = Instant::now();
        let root_url = self.config.crawler.root_url.trim().to_string();

        tracing::info!(
            "Starting crawl of {} (max depth: {}, max pages: {}, workers: {})",
            root_url,
            self.config.crawler.max_depth,
            self.config.crawler.max_pages,
            self.config.crawler.workers
        );

        if self.config.crawler.stay_in_domain {
            tracing::info!("Restricting crawl to host {}", self.frontier.root_domain());
        }

        if !self.frontier.admit(&root_url, 0) {
            tracing::warn!("Root URL {} was not admitted", root_url);
        }

        self.transition(RunPhase::Dispatching)?;

        let mut tasks: JoinSet<UnitOutcome> = JoinSet::new();
        let mut tally = OutcomeTally::default();

        let stop_reason = self.dispatch(&mut tasks, &mut tally).await;
        tracing::info!("Stopping dispatch: {}", stop_reason);

        self.transition(RunPhase::Draining)?;
        let forced_cancellation = self.drain(&mut tasks, &mut tally).await?;

        self.transition(RunPhase::Terminated)?;

        let summary = RunSummary {
            root_url,
            pages_crawled: self.frontier.crawled_count(),
            urls_discovered: self.frontier.discovered_count(),
            duration: start.elapsed(),
            stop_reason,
            started_at,
            finished_at: Local::now(),
            outcomes: tally,
            forced_cancellation,
        };

        tracing::info!(
            "Crawl completed: {} pages crawled, {} URLs discovered in {:?} ({})",
            summary.pages_crawled,
            summary.urls_discovered,
            summary.duration,
            summary.stop_reason
        );

        Ok(summary)
    }

    /// The dispatch loop; returns once no more units should be started
    async fn dispatch(
        &self,
        tasks: &mut JoinSet<UnitOutcome>,
        tally: &mut OutcomeTally,
    ) -> StopReason {
        let idle_backoff = self.config.timing.idle_backoff();

        loop {
            while let Some(result) = tasks.try_join_next() {
                reap(result, tally);
            }

            if self.shutdown.is_requested() {
                return StopReason::Interrupted;
            }

            if self.frontier.page_budget_reached() {
                return StopReason::PageBudget;
            }

            if self.phase.accepts_dispatch()
                && self.frontier.has_pending()
                && !self.frontier.page_slots_exhausted()
            {
                if let Ok(permit) = Arc::clone(&self.semaphore).try_acquire_owned() {
                    if let Some(item) = self.frontier.take_next() {
                        self.in_flight.fetch_add(1, Ordering::SeqCst);
                        let guard = InFlightGuard {
                            permit: Some(permit),
                            in_flight: Arc::clone(&self.in_flight),
                            frontier: Arc::clone(&self.frontier),
                        };

                        tracing::debug!("Dispatching {} (depth: {})", item.url, item.depth);
                        let task = CrawlTask::new(item, self.ctx.clone());
                        tasks.spawn(async move {
                            let _guard = guard;
                            task.run().await
                        });
                        continue;
                    }
                }
            }

            // In-flight first: with no unit running nothing can refill the queue
            if self.in_flight.load(Ordering::SeqCst) == 0 && !self.frontier.has_pending() {
                return StopReason::FrontierExhausted;
            }

            tokio::select! {
                _ = self.frontier.changed() => {}
                _ = self.shutdown.requested() => {}
                _ = sleep(idle_backoff) => {}
            }
        }
    }

    /// Waits for in-flight units, escalating to cancellation on timeout
    ///
    /// # Returns
    ///
    /// Whether units had to be aborted
    async fn drain(
        &mut self,
        tasks: &mut JoinSet<UnitOutcome>,
        tally: &mut OutcomeTally,
    ) -> Result<bool> {
        if !tasks.is_empty() {
            tracing::info!("Waiting for {} in-flight units", tasks.len());
        }

        let drain_grace = self.config.timing.drain_grace();
        if timeout(drain_grace, join_all(tasks, tally)).await.is_ok() {
            return Ok(false);
        }

        tracing::warn!(
            "{} units still running after {:?}, cancelling",
            tasks.len(),
            drain_grace
        );
        self.transition(RunPhase::Cancelling)?;

        self.frontier.close();
        tasks.abort_all();

        let cancel_grace = self.config.timing.cancel_grace();
        if timeout(cancel_grace, join_all(tasks, tally)).await.is_err() {
            tracing::error!(
                "{} units did not stop within {:?}",
                tasks.len(),
                cancel_grace
            );
        }

        Ok(true)
    }
}

async fn join_all(tasks: &mut JoinSet<UnitOutcome>, tally: &mut OutcomeTally) {
    while let Some(result) = tasks.join_next().await {
        reap(result, tally);
    }
}

fn reap(result: std::result::Result<UnitOutcome, JoinError>, tally: &mut OutcomeTally) {
    match result {
        Ok(outcome) => {
            tracing::trace!("Crawl unit finished: {}", outcome.label());
            tally.record(&outcome);
        }
        Err(e) if e.is_cancelled() => tally.record_cancelled(),
        Err(e) => {
            tracing::error!("Crawl unit panicked: {}", e);
            tally.record_panic();
        }
    }
}
