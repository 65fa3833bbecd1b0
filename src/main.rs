//! Ripple-Crawler main entry point
//!
//! This is the command-line interface for the Ripple-Crawler site crawler.

use anyhow::{bail, Context};
use clap::Parser;
use ripple_crawler::config::{load_config_with_hash, validate, Config};
use ripple_crawler::crawler::Scheduler;
use ripple_crawler::output::{print_summary, FileSummaryWriter, SummaryReporter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ripple-Crawler: a bounded, concurrent site crawler
///
/// Ripple-Crawler walks a site breadth-first from a root URL, saving every
/// HTML page it reaches until the depth or page budget runs out.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawler")]
#[command(version)]
#[command(about = "A bounded, concurrent site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Root URL to start crawling from (overrides the config file)
    #[arg(short, long)]
    root_url: Option<String>,

    /// Maximum link depth from the root
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Maximum number of pages to save
    #[arg(short = 'p', long)]
    max_pages: Option<usize>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Follow links to other hosts
    #[arg(long)]
    any_domain: bool,

    /// Directory for saved pages and the summary file
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawler=info,warn"),
            1 => EnvFilter::new("ripple_crawler=debug,info"),
            2 => EnvFilter::new("ripple_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies command-line overrides and
/// validates the result
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(root_url) = &cli.root_url {
        config.crawler.root_url = root_url.clone();
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if cli.any_domain {
        config.crawler.stay_in_domain = false;
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }

    if config.crawler.root_url.trim().is_empty() {
        bail!("No root URL given: pass --root-url or set crawler.root-url in a config file");
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Ripple-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root URL: {}", config.crawler.root_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Stay in domain: {}", config.crawler.stay_in_domain);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Max redirects: {}", config.fetcher.max_redirects);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory.display());
    println!("  Summary: {}", config.output.summary_file);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let reporter = FileSummaryWriter::new(&config.output.directory, &config.output.summary_file);

    let scheduler = Scheduler::from_config(config).context("Failed to start crawl")?;

    let shutdown = scheduler.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.request();
        }
    });

    let summary = scheduler.run().await.context("Crawl failed")?;

    reporter
        .report(&summary)
        .await
        .context("Failed to write crawl summary")?;
    print_summary(&summary);

    Ok(())
}
