//! Crawler module for repository tree walking
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching of listing and file pages
//! - HTML parsing and selector-based extraction
//! - Size header parsing and unit normalization
//! - The work-list driven tree walk

mod entry;
mod fetcher;
mod parser;
mod units;
mod walker;

pub use entry::{extension_of, FileEntry, PageKind};
pub use fetcher::{build_http_client, PageFetcher};
pub use parser::{
    extract_file_detail, extract_listing, parse_file_detail, parse_listing, parse_selector,
    Document, FileDetail, ListingRow, Node, PageSelectors,
};
pub use units::{parse_size, size_segment, to_bytes, unit_multiplier, UnitParseError};
pub use walker::{TreeWalker, WalkOptions};

use crate::config::Config;
use crate::ScrapeError;
use url::Url;

/// Builds a tree walker from configuration
///
/// This compiles the page selectors, builds the HTTP client and resolves the
/// base URL once, so every walk made by the returned walker shares them.
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(TreeWalker)` - Ready-to-use walker
/// * `Err(ScrapeError)` - Selector, URL or client setup failed
pub fn build_walker(config: &Config) -> Result<TreeWalker, ScrapeError> {
    let selectors = PageSelectors::compile(&config.selectors).map_err(|source| {
        ScrapeError::Parse {
            path: "[selectors]".to_string(),
            source,
        }
    })?;

    let base_url = Url::parse(&config.scraper.base_url).map_err(|source| {
        crate::FetchError::InvalidPath {
            path: config.scraper.base_url.clone(),
            source,
        }
    })?;

    let client =
        build_http_client(&config.scraper, &config.user_agent).map_err(ScrapeError::Client)?;

    Ok(TreeWalker::new(
        PageFetcher::new(client, base_url),
        selectors,
        WalkOptions::from(&config.scraper),
    ))
}
