//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from <a> tags and canonical links)
//! - Page title

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// File extensions that never lead to crawlable HTML pages
const SKIPPED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "pdf", "zip", "exe", "dmg", "mp4", "mp3", "css", "js", "ico",
    "svg",
];

/// Extracts outbound links and titles from page content
///
/// Implementations are pure functions of their input and shared across workers.
pub trait LinkExtractor: Send + Sync {
    /// Returns the set of absolute, crawlable URLs linked from `html`
    fn extract_links(&self, html: &str, base_url: &str) -> HashSet<String>;

    /// Returns the page title, or an empty string if there is none
    fn extract_title(&self, html: &str) -> String;
}

/// Link extractor built on `scraper`
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
/// - Non-HTTP(S) URLs after resolution
/// - Media, script and style resources (by extension)
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, html: &str, base_url: &str) -> HashSet<String> {
        let base_url = match Url::parse(base_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Cannot resolve links against {}: {}", base_url, e);
                return HashSet::new();
            }
        };

        let document = Html::parse_document(html);
        extract_links(&document, &base_url)
    }

    fn extract_title(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        extract_title(&document).unwrap_or_default()
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> HashSet<String> {
    let mut links = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.insert(absolute_url);
                }
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.insert(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
/// - URLs whose path ends in a skipped extension
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;

    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    if has_skipped_extension(&absolute_url) {
        return None;
    }

    Some(absolute_url.to_string())
}

fn has_skipped_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.contains('/') => SKIPPED_EXTENSIONS.contains(&ext),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com/page";

    fn links(html: &str) -> HashSet<String> {
        HtmlLinkExtractor.extract_links(html, BASE)
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>Test Page</title></head><body></body></html>"#;
        assert_eq!(HtmlLinkExtractor.extract_title(html), "Test Page");
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        assert_eq!(HtmlLinkExtractor.extract_title(html), "Test Page");
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        assert_eq!(HtmlLinkExtractor.extract_title(html), "");
        assert_eq!(HtmlLinkExtractor.extract_title("garbage <<<"), "");
    }

    #[test]
    fn test_extract_absolute_link() {
        let found = links(r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#);
        assert_eq!(found.len(), 1);
        assert!(found.contains("https://other.com/page"));
    }

    #[test]
    fn test_extract_relative_links() {
        let found = links(r#"<a href="/other">A</a><a href="sibling">B</a>"#);
        assert!(found.contains("https://example.com/other"));
        assert!(found.contains("https://example.com/sibling"));
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <a href="javascript:void(0)">js</a>
            <a href="JavaScript:alert(1)">js</a>
            <a href="mailto:test@example.com">mail</a>
            <a href="tel:+1234567890">call</a>
            <a href="data:text/html,<h1>x</h1>">data</a>
            <a href="ftp://example.com/file">ftp</a>
        "#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_skip_download_and_fragment() {
        let html = r##"<a href="/report" download>Download</a><a href="#section">Jump</a>"##;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_skip_media_extensions() {
        let html = r#"
            <a href="/photo.JPG">img</a>
            <a href="/doc.pdf">pdf</a>
            <a href="/app.js">js</a>
            <a href="/style.css">css</a>
            <a href="/archive.zip">zip</a>
            <a href="/article.html">page</a>
            <a href="/v1.2/guide">versioned</a>
        "#;
        let found = links(html);
        assert_eq!(found.len(), 2);
        assert!(found.contains("https://example.com/article.html"));
        assert!(found.contains("https://example.com/v1.2/guide"));
    }

    #[test]
    fn test_extract_canonical_link() {
        let html = r#"<html><head><link rel="canonical" href="https://example.com/canonical" /></head><body></body></html>"#;
        assert!(links(html).contains("https://example.com/canonical"));
    }

    #[test]
    fn test_duplicate_links_collapse() {
        let html = r#"<a href="/same">1</a><a href="/same">2</a><a href="https://example.com/same">3</a>"#;
        assert_eq!(links(html).len(), 1);
    }

    #[test]
    fn test_invalid_base_url() {
        let found = HtmlLinkExtractor.extract_links(r#"<a href="/x">x</a>"#, "not a url");
        assert!(found.is_empty());
    }
}
