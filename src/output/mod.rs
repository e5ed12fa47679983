//! Output module for rendering census results
//!
//! This module handles:
//! - Plain-text tables for the terminal
//! - Markdown reports
//! - JSON in the `{extension, totalSizeBytes, totalLineCount}` shape

mod markdown;
mod table;

pub use markdown::format_markdown_report;
pub use table::format_table;

use crate::aggregate::AggregateBucket;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

/// Totals across every bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub extensions: usize,
    pub size_bytes: f64,
    pub line_count: u64,
}

impl Totals {
    pub fn of(buckets: &[AggregateBucket]) -> Self {
        Self {
            extensions: buckets.len(),
            size_bytes: buckets.iter().map(|b| b.total_size_bytes).sum(),
            line_count: buckets.iter().map(|b| b.total_line_count).sum(),
        }
    }
}

/// Formats a byte count for humans (decimal units)
pub fn human_size(bytes: f64) -> String {
    humansize::format_size(bytes.max(0.0).round() as u64, humansize::DECIMAL)
}

/// Renders buckets in the requested format
///
/// # Arguments
///
/// * `repository` - Repository the buckets belong to (used in headings)
/// * `buckets` - The aggregated result
/// * `format` - Output format
pub fn render(
    repository: &str,
    buckets: &[AggregateBucket],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(format_table(buckets)),
        OutputFormat::Markdown => Ok(format_markdown_report(repository, buckets)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(buckets)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Writes rendered output to a file
pub fn write_output(rendered: &str, output_path: &Path) -> std::io::Result<()> {
    let mut file = File::create(output_path)?;
    file.write_all(rendered.as_bytes())?;
    Ok(())
}
