//! URL handling module for Ripple-Crawler
//!
//! This module provides URL normalization and host extraction, the two pure
//! building blocks the frontier uses to decide whether a URL has been seen
//! and whether it belongs to the crawl's domain.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_domain};
pub use normalize::normalize_url;
