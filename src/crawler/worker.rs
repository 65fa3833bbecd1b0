//! Fetch-extract unit: the work done for one crawl item
//!
//! A unit fetches its URL, saves the page when a budget slot is free, and
//! offers the page's links back to the frontier one level deeper. Link
//! admission depends only on the fetch: a page that could not be saved still
//! leads the crawl onward. Failures are logged and reported as a
//! [`UnitOutcome`]; they never escape the unit.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{CrawlItem, Frontier};
use crate::crawler::parser::LinkExtractor;
use crate::output::{ContentSink, SavedPage};
use std::sync::Arc;

/// How a unit of work ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Page saved and counted; `links_admitted` new URLs were queued
    Saved { links_admitted: usize },

    /// Network error, bad status or non-HTML response
    FetchFailed,

    /// Fetch succeeded with an empty body
    Empty,

    /// The content sink rejected the page; its links were still offered
    SaveFailed { links_admitted: usize },

    /// Every page slot was already claimed; its links were still offered
    BudgetExhausted { links_admitted: usize },
}

impl UnitOutcome {
    /// Label used in logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            UnitOutcome::Saved { .. } => "saved",
            UnitOutcome::FetchFailed => "fetch failed",
            UnitOutcome::Empty => "empty",
            UnitOutcome::SaveFailed { .. } => "save failed",
            UnitOutcome::BudgetExhausted { .. } => "budget exhausted",
        }
    }

    /// New URLs this unit queued
    pub fn links_admitted(&self) -> usize {
        match self {
            UnitOutcome::Saved { links_admitted }
            | UnitOutcome::SaveFailed { links_admitted }
            | UnitOutcome::BudgetExhausted { links_admitted } => *links_admitted,
            UnitOutcome::FetchFailed | UnitOutcome::Empty => 0,
        }
    }
}

/// Per-outcome counts for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub saved: usize,
    pub fetch_failed: usize,
    pub empty: usize,
    pub save_failed: usize,
    pub budget_exhausted: usize,

    /// Units that panicked
    pub panicked: usize,

    /// Units aborted during forced cancellation
    pub cancelled: usize,

    /// Links admitted by all units
    pub links_admitted: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: &UnitOutcome) {
        match outcome {
            UnitOutcome::Saved { .. } => self.saved += 1,
            UnitOutcome::FetchFailed => self.fetch_failed += 1,
            UnitOutcome::Empty => self.empty += 1,
            UnitOutcome::SaveFailed { .. } => self.save_failed += 1,
            UnitOutcome::BudgetExhausted { .. } => self.budget_exhausted += 1,
        }
        self.links_admitted += outcome.links_admitted();
    }

    pub fn record_panic(&mut self) {
        self.panicked += 1;
    }

    pub fn record_cancelled(&mut self) {
        self.cancelled += 1;
    }

    /// Total number of units accounted for
    pub fn total(&self) -> usize {
        self.saved
            + self.fetch_failed
            + self.empty
            + self.save_failed
            + self.budget_exhausted
            + self.panicked
            + self.cancelled
    }

    /// Label/count pairs in a stable order
    pub fn breakdown(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("saved", self.saved),
            ("fetch failed", self.fetch_failed),
            ("empty", self.empty),
            ("save failed", self.save_failed),
            ("budget exhausted", self.budget_exhausted),
            ("panicked", self.panicked),
            ("cancelled", self.cancelled),
        ]
    }
}

/// Shared collaborators for every unit of a run
#[derive(Clone)]
pub struct UnitContext {
    pub frontier: Arc<Frontier>,
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn LinkExtractor>,
    pub sink: Arc<dyn ContentSink>,
    pub max_depth: u32,
}

/// One fetch-extract unit
pub struct CrawlTask {
    item: CrawlItem,
    ctx: UnitContext,
}

impl CrawlTask {
    pub fn new(item: CrawlItem, ctx: UnitContext) -> Self {
        Self { item, ctx }
    }

    /// Runs the unit to completion
    ///
    /// 1. Fetches the page; any failure ends the unit without side effects.
    /// 2. Claims a page slot, saves the page and commits the slot. A failed
    ///    save (or a panic) drops the slot, which returns it to the budget.
    /// 3. Below the depth limit, admits every extracted link at `depth + 1`,
    ///    whether or not the page was saved.
    pub async fn run(self) -> UnitOutcome {
        let CrawlTask { item, ctx } = self;

        let page = match ctx.fetcher.fetch(&item.url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", item.url, e);
                return UnitOutcome::FetchFailed;
            }
        };

        if page.body.is_empty() {
            tracing::debug!("Empty response from {}", item.url);
            return UnitOutcome::Empty;
        }

        let saved = save_page(&ctx, &item, &page.body).await;
        let links_admitted = admit_links(&ctx, &item, &page.body, &page.final_url);

        match saved {
            SaveStatus::Saved => UnitOutcome::Saved { links_admitted },
            SaveStatus::Failed => UnitOutcome::SaveFailed { links_admitted },
            SaveStatus::NoSlot => UnitOutcome::BudgetExhausted { links_admitted },
        }
    }
}

enum SaveStatus {
    Saved,
    Failed,
    NoSlot,
}

async fn save_page(ctx: &UnitContext, item: &CrawlItem, body: &str) -> SaveStatus {
    let slot = match ctx.frontier.reserve_page() {
        Some(slot) => slot,
        None => {
            tracing::debug!("Page budget claimed, not saving {}", item.url);
            return SaveStatus::NoSlot;
        }
    };

    let title = ctx.extractor.extract_title(body);
    let page = SavedPage {
        url: &item.url,
        depth: item.depth,
        title: &title,
        content: body,
    };

    if let Err(e) = ctx.sink.save(&page).await {
        tracing::error!("Failed to save {}: {}", item.url, e);
        return SaveStatus::Failed;
    }

    if let Some(count) = slot.commit() {
        tracing::info!(
            "Crawled [{}/{}]: {} (depth: {})",
            count,
            ctx.frontier.max_pages(),
            item.url,
            item.depth
        );
    }
    SaveStatus::Saved
}

fn admit_links(ctx: &UnitContext, item: &CrawlItem, body: &str, base_url: &str) -> usize {
    if item.depth >= ctx.max_depth {
        return 0;
    }

    let links = ctx.extractor.extract_links(body, base_url);
    let admitted = links
        .iter()
        .filter(|link| ctx.frontier.admit(link, item.depth + 1))
        .count();
    tracing::debug!(
        "{}: {} links found, {} admitted",
        item.url,
        links.len(),
        admitted
    );
    admitted
}
