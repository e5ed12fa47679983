//! HTML parser for listing and file detail pages
//!
//! This module wraps `scraper` behind a small document API and holds the
//! extraction rules for the two page shapes the walker visits:
//! - Directory listings: one row per child, each with a header anchor
//! - File detail pages: a content table with line numbers and a size header
//!
//! Parsing itself never fails. Missing optional nodes come back as empty
//! selections or `None`; only values that are present but unreadable are
//! reported as errors.

use crate::config::SelectorConfig;
use crate::crawler::units::{parse_size, size_segment};
use crate::ParseError;
use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses markup into a navigable document
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Returns every node matching `selector`, in document order
    pub fn select(&self, selector: &Selector) -> Vec<Node<'_>> {
        self.html.select(selector).map(Node::new).collect()
    }

    /// Returns the first node matching `selector`
    pub fn first(&self, selector: &Selector) -> Option<Node<'_>> {
        self.html.select(selector).next().map(Node::new)
    }

    /// Returns the last node matching `selector`
    pub fn last(&self, selector: &Selector) -> Option<Node<'_>> {
        self.html.select(selector).last().map(Node::new)
    }
}

/// An element inside a [`Document`]
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> Node<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Concatenated text of this node and its descendants
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Value of the named attribute, if present
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Descendants matching `selector`, in document order
    pub fn select(&self, selector: &Selector) -> Vec<Node<'a>> {
        self.element.select(selector).map(Node::new).collect()
    }

    /// First descendant matching `selector`
    pub fn first(&self, selector: &Selector) -> Option<Node<'a>> {
        self.element.select(selector).next().map(Node::new)
    }
}

/// Compiles a CSS selector, reporting the offending text on failure
pub fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Compiled selectors for listing and file detail pages
#[derive(Debug, Clone)]
pub struct PageSelectors {
    listing_row: Selector,
    row_anchor: Selector,
    content_row: Selector,
    line_number_cell: Selector,
    line_number_attribute: String,
    size_header: Selector,
    file_marker: String,
}

impl PageSelectors {
    /// Compiles every selector from configuration
    pub fn compile(config: &SelectorConfig) -> Result<Self, ParseError> {
        Ok(Self {
            listing_row: parse_selector(&config.listing_row)?,
            row_anchor: parse_selector(&config.row_anchor)?,
            content_row: parse_selector(&config.content_row)?,
            line_number_cell: parse_selector(&config.line_number_cell)?,
            line_number_attribute: config.line_number_attribute.clone(),
            size_header: parse_selector(&config.size_header)?,
            file_marker: config.file_marker.clone(),
        })
    }

    /// The link segment that marks a file detail page
    pub fn file_marker(&self) -> &str {
        &self.file_marker
    }
}

/// A child entry read from a directory listing row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Display name of the entry
    pub name: String,

    /// Link target of the entry
    pub href: String,
}

/// Values read from a file detail page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileDetail {
    /// Line number of the last content row, 0 when the table is empty
    pub line_count: u64,

    /// Normalized size, `None` when the page has no size header
    pub size_bytes: Option<f64>,
}

/// Extracts the child entries of a directory listing
///
/// Rows without an anchor, or whose anchor has no `href`, are layout
/// artifacts and are skipped.
pub fn extract_listing(document: &Document, selectors: &PageSelectors) -> Vec<ListingRow> {
    let mut rows = Vec::new();

    for row in document.select(&selectors.listing_row) {
        let Some(anchor) = row.first(&selectors.row_anchor) else {
            tracing::trace!("Skipping listing row without entry link");
            continue;
        };

        let Some(href) = anchor.attribute("href").map(str::trim).filter(|h| !h.is_empty())
        else {
            tracing::trace!("Skipping listing anchor without href");
            continue;
        };

        rows.push(ListingRow {
            name: anchor.text().trim().to_string(),
            href: href.to_string(),
        });
    }

    rows
}

/// Extracts the line count and size from a file detail page
pub fn extract_file_detail(
    document: &Document,
    selectors: &PageSelectors,
) -> Result<FileDetail, ParseError> {
    let line_count = extract_line_count(document, selectors)?;

    let size_bytes = match document.first(&selectors.size_header) {
        Some(header) => Some(parse_size(&size_segment(&header.text()))?),
        None => None,
    };

    Ok(FileDetail {
        line_count,
        size_bytes,
    })
}

/// Reads the trailing line number of the content table
fn extract_line_count(document: &Document, selectors: &PageSelectors) -> Result<u64, ParseError> {
    let Some(last_row) = document.last(&selectors.content_row) else {
        return Ok(0);
    };

    let value = last_row
        .first(&selectors.line_number_cell)
        .and_then(|cell| cell.attribute(&selectors.line_number_attribute));

    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidLineNumber(raw.to_string())),
        None => {
            tracing::debug!("Last content row carries no line number");
            Ok(0)
        }
    }
}

/// Parses listing markup and extracts its rows
pub fn parse_listing(markup: &str, selectors: &PageSelectors) -> Vec<ListingRow> {
    let document = Document::parse(markup);
    extract_listing(&document, selectors)
}

/// Parses file detail markup and extracts its line count and size
pub fn parse_file_detail(markup: &str, selectors: &PageSelectors) -> Result<FileDetail, ParseError> {
    let document = Document::parse(markup);
    extract_file_detail(&document, selectors)
}
