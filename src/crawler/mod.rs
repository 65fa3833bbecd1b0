//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier of visited and pending URLs
//! - HTTP fetching and HTML link extraction
//! - The fetch-extract unit run for every crawl item
//! - The scheduler that dispatches units and drains the run

mod fetcher;
mod frontier;
mod parser;
mod scheduler;
mod worker;

pub use fetcher::{
    build_http_client, is_html_content_type, FetchError, FetchedPage, Fetcher, HttpFetcher,
};
pub use frontier::{CrawlItem, Frontier};
pub use parser::{HtmlLinkExtractor, LinkExtractor};
pub use scheduler::{Scheduler, ShutdownHandle};
pub use worker::{CrawlTask, OutcomeTally, UnitContext, UnitOutcome};

use crate::config::Config;
use crate::output::{FileSummaryWriter, RunSummary, SummaryReporter};
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Create the output directory and HTTP client
/// 3. Crawl from the root URL until a stop condition holds
/// 4. Write the summary file next to the saved pages
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl finished
/// * `Err(CrawlError)` - Invalid configuration or unusable output directory
pub async fn crawl(config: Config) -> Result<RunSummary> {
    let reporter = FileSummaryWriter::new(&config.output.directory, &config.output.summary_file);
    let summary = Scheduler::from_config(config)?.run().await?;
    reporter.report(&summary).await?;
    Ok(summary)
}
