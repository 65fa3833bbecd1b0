use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Ripple-Crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Creates a configuration with defaults for everything but the root URL
    pub fn for_root(root_url: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                root_url: root_url.into(),
                ..CrawlerConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Crawl scope and budget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from (depth 0)
    #[serde(rename = "root-url", default)]
    pub root_url: String,

    /// Maximum link depth to follow from the root
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages fetched and saved
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Size of the worker pool
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Only admit URLs on the root URL's host
    #[serde(rename = "stay-in-domain", default = "default_stay_in_domain")]
    pub stay_in_domain: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            workers: default_workers(),
            stay_in_domain: default_stay_in_domain(),
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum number of redirects followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Scheduler timing knobs
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Longest the dispatch loop sleeps when the frontier is momentarily empty (milliseconds)
    #[serde(rename = "idle-backoff-ms", default = "default_idle_backoff_ms")]
    pub idle_backoff_ms: u64,

    /// Time in-flight units get to finish once draining starts (seconds)
    #[serde(rename = "drain-grace-secs", default = "default_drain_grace_secs")]
    pub drain_grace_secs: u64,

    /// Time aborted units get to unwind after forced cancellation (seconds)
    #[serde(rename = "cancel-grace-secs", default = "default_cancel_grace_secs")]
    pub cancel_grace_secs: u64,
}

impl TimingConfig {
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn drain_grace(&self) -> Duration {
        Duration::from_secs(self.drain_grace_secs)
    }

    pub fn cancel_grace(&self) -> Duration {
        Duration::from_secs(self.cancel_grace_secs)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            idle_backoff_ms: default_idle_backoff_ms(),
            drain_grace_secs: default_drain_grace_secs(),
            cancel_grace_secs: default_cancel_grace_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory crawled pages and the run summary are written to
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// File name of the run summary inside `directory`
    #[serde(rename = "summary-file", default = "default_summary_file")]
    pub summary_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            summary_file: default_summary_file(),
        }
    }
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_pages() -> usize {
    100
}

fn default_workers() -> usize {
    10
}

fn default_stay_in_domain() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("ripple-crawler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_redirects() -> usize {
    10
}

fn default_idle_backoff_ms() -> u64 {
    100
}

fn default_drain_grace_secs() -> u64 {
    60
}

fn default_cancel_grace_secs() -> u64 {
    30
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("crawled_data")
}

fn default_summary_file() -> String {
    "crawl_summary.txt".to_string()
}
