//! Markdown report generation
//!
//! This module renders a census result as a markdown document with an
//! overview section and one table row per extension.

use crate::aggregate::AggregateBucket;
use crate::output::{human_size, Totals};

/// Formats a census result as markdown
///
/// # Arguments
///
/// * `repository` - The `owner/name` the result belongs to
/// * `buckets` - The aggregated result
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(repository: &str, buckets: &[AggregateBucket]) -> String {
    let totals = Totals::of(buckets);
    let mut md = String::new();

    md.push_str(&format!("# Repository Census: {}\n\n", repository));

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **File types**: {}\n", totals.extensions));
    md.push_str(&format!("- **Total lines**: {}\n", totals.line_count));
    md.push_str(&format!(
        "- **Total size**: {} ({:.0} bytes)\n\n",
        human_size(totals.size_bytes),
        totals.size_bytes
    ));

    md.push_str("## By Extension\n\n");

    if buckets.is_empty() {
        md.push_str("*No files found.*\n");
        return md;
    }

    md.push_str("| Extension | Lines | Bytes | Size | Share of lines |\n");
    md.push_str("|-----------|------:|------:|-----:|---------------:|\n");

    for bucket in buckets {
        let share = if totals.line_count > 0 {
            (bucket.total_line_count as f64 / totals.line_count as f64) * 100.0
        } else {
            0.0
        };

        md.push_str(&format!(
            "| {} | {} | {:.0} | {} | {:.1}% |\n",
            escape_cell(&bucket.extension),
            bucket.total_line_count,
            bucket.total_size_bytes,
            human_size(bucket.total_size_bytes),
            share
        ));
    }

    md
}

/// Escapes characters that would break a table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
