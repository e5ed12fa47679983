//! Plain-text table for terminal output

use crate::aggregate::AggregateBucket;
use crate::output::{human_size, Totals};

/// Formats buckets as an aligned table with a totals line
pub fn format_table(buckets: &[AggregateBucket]) -> String {
    if buckets.is_empty() {
        return "No files found.\n".to_string();
    }

    let width = buckets
        .iter()
        .map(|b| b.extension.chars().count())
        .max()
        .unwrap_or(0)
        .max("Extension".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$}  {:>12}  {:>14}  {:>12}\n",
        "Extension",
        "Lines",
        "Bytes",
        "Size",
        width = width
    ));
    out.push_str(&format!("{}\n", "-".repeat(width + 44)));

    for bucket in buckets {
        out.push_str(&format!(
            "{:<width$}  {:>12}  {:>14.0}  {:>12}\n",
            bucket.extension,
            bucket.total_line_count,
            bucket.total_size_bytes,
            human_size(bucket.total_size_bytes),
            width = width
        ));
    }

    let totals = Totals::of(buckets);
    out.push_str(&format!("{}\n", "-".repeat(width + 44)));
    out.push_str(&format!(
        "{:<width$}  {:>12}  {:>14.0}  {:>12}\n",
        format!("{} types", totals.extensions),
        totals.line_count,
        totals.size_bytes,
        human_size(totals.size_bytes),
        width = width
    ));

    out
}
