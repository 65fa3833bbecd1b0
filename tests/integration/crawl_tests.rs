//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, writing pages into temporary directories.

use ripple_crawler::config::Config;
use ripple_crawler::crawler::crawl;
use ripple_crawler::output::page_filename;
use ripple_crawler::{normalize_url, CrawlError, StopReason};
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at the mock server
fn create_test_config(root_url: &str, output: &Path) -> Config {
    let mut config = Config::for_root(root_url);
    config.crawler.max_depth = 3;
    config.crawler.max_pages = 100;
    config.crawler.workers = 4;
    config.fetcher.timeout_secs = 2;
    config.timing.idle_backoff_ms = 20;
    config.output.directory = output.to_path_buf();
    config
}

/// Builds an HTML response linking to each of `links`
fn html_page(title: &str, links: &[String]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>\n", href, href))
        .collect();
    let body = format!(
        "<html><head><title>{}</title></head><body>\n{}</body></html>",
        title, anchors
    );
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[String]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(title, links))
        .mount(server)
        .await;
}

fn count_html_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .expect("output directory should exist")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().map_or(false, |ext| ext == "html"))
        .count()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let out = tempdir().unwrap();

    mount_page(
        &server,
        "/",
        "Home",
        &[format!("{}/page1", base_url), "/page2".to_string()],
    )
    .await;
    mount_page(
        &server,
        "/page1",
        "Page 1",
        &["/page2".to_string(), "/".to_string()],
    )
    .await;
    mount_page(&server, "/page2", "Page 2", &["page1#top".to_string()]).await;

    let summary = crawl(create_test_config(&base_url, out.path()))
        .await
        .expect("crawl should succeed");

    assert_eq!(summary.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(summary.pages_crawled, 3);
    assert_eq!(summary.urls_discovered, 3);
    assert_eq!(summary.outcomes.saved, 3);
    assert!(!summary.forced_cancellation);

    assert_eq!(count_html_files(out.path()), 3);

    let page1 = std::fs::read_to_string(
        out.path()
            .join(page_filename(&normalize_url(&format!("{}/page1", base_url)))),
    )
    .expect("page1 should be saved");
    assert!(page1.contains("Page Title: Page 1"));
    assert!(page1.contains("Depth Level: 1"));
    assert!(page1.contains("<title>Page 1</title>"));

    let report = std::fs::read_to_string(out.path().join("crawl_summary.txt"))
        .expect("summary file should be written");
    assert!(report.contains("Web Crawler Summary"));
    assert!(report.contains("Total Pages Crawled: 3"));
    assert!(report.contains("Total URLs Discovered: 3"));
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let out = tempdir().unwrap();

    mount_page(&server, "/", "Home", &["/level1".to_string()]).await;
    mount_page(&server, "/level1", "Level 1", &["/level2".to_string()]).await;

    // Beyond max depth: must never be requested
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html_page("Level 2", &[]))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&base_url, out.path());
    config.crawler.max_depth = 1;

    let summary = crawl(config).await.expect("crawl should succeed");

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.urls_discovered, 2);
    server.verify().await;
}

#[tokio::test]
async fn test_content_type_handling() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let out = tempdir().unwrap();

    mount_page(
        &server,
        "/",
        "Home",
        &[
            "/download".to_string(),
            "/missing".to_string(),
            "/logo.png".to_string(),
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Skipped by extension before it is ever admitted
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let summary = crawl(create_test_config(&base_url, out.path()))
        .await
        .expect("crawl should succeed");

    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(summary.urls_discovered, 3);
    assert_eq!(summary.outcomes.saved, 1);
    assert_eq!(summary.outcomes.fetch_failed, 2);
    assert_eq!(count_html_files(out.path()), 1);
    server.verify().await;
}

#[tokio::test]
async fn test_max_pages_budget() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let out = tempdir().unwrap();

    let children: Vec<String> = (0..10).map(|i| format!("/item{}", i)).collect();
    mount_page(&server, "/", "Home", &children).await;
    for child in &children {
        mount_page(&server, child, child, &[]).await;
    }

    let mut config = create_test_config(&base_url, out.path());
    config.crawler.max_pages = 3;

    let summary = crawl(config).await.expect("crawl should succeed");

    assert_eq!(summary.stop_reason, StopReason::PageBudget);
    assert_eq!(summary.pages_crawled, 3);
    assert_eq!(summary.urls_discovered, 11);
    assert_eq!(count_html_files(out.path()), 3);
}

#[tokio::test]
async fn test_stay_in_domain() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let out = tempdir().unwrap();

    // Same server, different host name
    let port = server.address().port();
    let foreign = format!("http://localhost:{}/foreign", port);

    mount_page(&server, "/", "Home", &[foreign, "/local".to_string()]).await;
    mount_page(&server, "/local", "Local", &[]).await;

    Mock::given(method("GET"))
        .and(path("/foreign"))
        .respond_with(html_page("Foreign", &[]))
        .expect(0)
        .mount(&server)
        .await;

    let summary = crawl(create_test_config(&base_url, out.path()))
        .await
        .expect("crawl should succeed");

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.urls_discovered, 2);
    server.verify().await;
}

#[tokio::test]
async fn test_invalid_config_fails_fast() {
    let server = MockServer::start().await;
    let out = tempdir().unwrap();
    let output = out.path().join("never-created");

    Mock::given(method("GET"))
        .respond_with(html_page("Home", &[]))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), &output);
    config.crawler.workers = 0;

    let result = crawl(config).await;

    assert!(matches!(result, Err(CrawlError::Config(_))));
    assert!(!output.exists());
    server.verify().await;
}
