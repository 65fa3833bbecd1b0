//! Output traits and types
//!
//! This module defines the trait interfaces the crawl core hands results to:
//! a content sink for every saved page and a reporter for the final run
//! summary.

use crate::crawler::OutcomeTally;
use crate::state::StopReason;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A fetched page ready to be persisted
#[derive(Debug, Clone, Copy)]
pub struct SavedPage<'a> {
    /// The normalized URL the page was fetched from
    pub url: &'a str,

    /// Crawl depth of the page
    pub depth: u32,

    /// Page title (empty when absent)
    pub title: &'a str,

    /// Raw HTML content
    pub content: &'a str,
}

/// Summary of a finished crawl run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub root_url: String,
    pub pages_crawled: usize,
    pub urls_discovered: usize,
    pub duration: Duration,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,

    /// Per-outcome counts of the units that ran
    pub outcomes: OutcomeTally,

    /// True if the drain grace expired and units had to be aborted
    pub forced_cancellation: bool,
}

/// Trait for persisting crawled pages
///
/// Implementations are shared across workers and must tolerate concurrent
/// calls.
#[async_trait]
pub trait ContentSink: Send + Sync {
    /// Persists a single page
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the page was written
    /// * `Err(OutputError)` - The page could not be persisted
    async fn save(&self, page: &SavedPage<'_>) -> OutputResult<PathBuf>;
}

/// Trait for handing the final run summary to a reporting backend
#[async_trait]
pub trait SummaryReporter: Send + Sync {
    async fn report(&self, summary: &RunSummary) -> OutputResult<()>;
}
