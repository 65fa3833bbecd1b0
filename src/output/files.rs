//! File-backed output handlers
//!
//! Pages are written one file per URL, named by the SHA-256 of the URL so
//! names are unique, stable, and filesystem safe. The run summary is written
//! as a small plain-text report next to them.

use crate::output::traits::{
    ContentSink, OutputResult, RunSummary, SavedPage, SummaryReporter,
};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes crawled pages as HTML files into a directory
#[derive(Debug, Clone)]
pub struct FileContentSink {
    directory: PathBuf,
}

impl FileContentSink {
    /// Creates the sink, creating the output directory if needed
    pub fn create(directory: impl Into<PathBuf>) -> OutputResult<Self> {
        let directory = directory.into();
        if !directory.exists() {
            std::fs::create_dir_all(&directory)?;
            tracing::info!("Created output directory: {}", directory.display());
        }
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl ContentSink for FileContentSink {
    async fn save(&self, page: &SavedPage<'_>) -> OutputResult<PathBuf> {
        let filename = page_filename(page.url);
        let path = self.directory.join(&filename);

        tokio::fs::write(&path, render_page(page, Local::now())).await?;

        tracing::info!("Saved: {} (depth: {}) -> {}", page.url, page.depth, filename);
        Ok(path)
    }
}

/// Derives the file name a page is stored under
pub fn page_filename(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{}.html", hex::encode(digest))
}

/// Renders the metadata header followed by the page content
fn render_page(page: &SavedPage<'_>, crawled_at: DateTime<Local>) -> String {
    let mut out = String::with_capacity(page.content.len() + 256);
    out.push_str(&format!("<!-- Crawled URL: {} -->\n", page.url));
    out.push_str(&format!(
        "<!-- Crawl Time: {} -->\n",
        crawled_at.format(TIME_FORMAT)
    ));
    out.push_str(&format!("<!-- Depth Level: {} -->\n", page.depth));
    out.push_str(&format!("<!-- Page Title: {} -->\n", escape_html(page.title)));
    out.push_str("<!-- ================================================ -->\n\n");
    out.push_str(page.content);
    out
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Writes the run summary as a plain-text file
#[derive(Debug, Clone)]
pub struct FileSummaryWriter {
    path: PathBuf,
    output_directory: PathBuf,
}

impl FileSummaryWriter {
    /// Creates a writer that places `file_name` inside `output_directory`
    pub fn new(output_directory: impl Into<PathBuf>, file_name: &str) -> Self {
        let output_directory = output_directory.into();
        Self {
            path: output_directory.join(file_name),
            output_directory,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self, summary: &RunSummary) -> String {
        let absolute = std::fs::canonicalize(&self.output_directory)
            .unwrap_or_else(|_| self.output_directory.clone());

        let mut out = String::new();
        out.push_str("Web Crawler Summary\n");
        out.push_str("===================\n\n");
        out.push_str(&format!(
            "Crawl Time: {}\n",
            summary.finished_at.format(TIME_FORMAT)
        ));
        out.push_str(&format!("Root URL: {}\n", summary.root_url));
        out.push_str(&format!("Total Pages Crawled: {}\n", summary.pages_crawled));
        out.push_str(&format!(
            "Total URLs Discovered: {}\n",
            summary.urls_discovered
        ));
        out.push_str(&format!(
            "Duration: {} seconds\n",
            summary.duration.as_secs()
        ));
        out.push_str(&format!("Stopped: {}\n", summary.stop_reason));
        out.push_str(&format!("Output Directory: {}\n", absolute.display()));
        out
    }
}

#[async_trait]
impl SummaryReporter for FileSummaryWriter {
    async fn report(&self, summary: &RunSummary) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, self.render(summary)).await?;
        tracing::info!("Created crawl summary: {}", self.path.display());
        Ok(())
    }
}
