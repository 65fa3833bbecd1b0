//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with timeouts, user agent and redirect policy
//! - GET requests to fetch page content
//! - Rejecting non-200 and non-HTML responses
//! - Error classification

use crate::config::FetcherConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use thiserror::Error;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value (empty if the server sent none)
    pub content_type: String,
    /// Page body content
    pub body: String,
}

/// Why a URL yielded no page
///
/// These are transient, per-URL failures; the crawler logs them and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("non-HTML content type: {0}")]
    NotHtml(String),

    #[error("request timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("redirect error: {0}")]
    Redirect(String),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if e.is_redirect() {
            FetchError::Redirect(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Source of page content for the crawler
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL, returning its HTML or the reason it could not be used
    ///
    /// Implementations must bound the time spent on a single URL.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use ripple_crawler::config::FetcherConfig;
/// use ripple_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header value denotes HTML
///
/// A missing header is given the benefit of the doubt.
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        Some(value) => value.to_ascii_lowercase().contains("text/html"),
        None => true,
    }
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL
    ///
    /// # Request Flow
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | HTTP 200, HTML or no Content-Type | `Ok(FetchedPage)` |
    /// | Any other status | `FetchError::Status` |
    /// | Non-HTML Content-Type | `FetchError::NotHtml` |
    /// | Timeout | `FetchError::Timeout` |
    /// | Connection refused, DNS, TLS | `FetchError::Connect` |
    /// | Too many redirects | `FetchError::Redirect` |
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !is_html_content_type(content_type.as_deref()) {
            return Err(FetchError::NotHtml(content_type.unwrap_or_default()));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| match FetchError::from(e) {
                FetchError::Request(message) => FetchError::Body(message),
                other => other,
            })?;

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type: content_type.unwrap_or_default(),
            body,
        })
    }
}
