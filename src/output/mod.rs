//! Output module for persisting pages and reporting crawl results
//!
//! This module handles:
//! - Writing crawled pages to disk
//! - Writing the run summary file
//! - Rendering the console report

mod files;
pub mod stats;
mod traits;

pub use files::{page_filename, FileContentSink, FileSummaryWriter};
pub use stats::{format_summary, print_summary};
pub use traits::{
    ContentSink, OutputError, OutputResult, RunSummary, SavedPage, SummaryReporter,
};
