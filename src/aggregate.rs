//! Per-extension aggregation of walk results

use crate::crawler::FileEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Totals for one file extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBucket {
    pub extension: String,
    pub total_size_bytes: f64,
    pub total_line_count: u64,
}

impl AggregateBucket {
    /// An empty bucket for `extension`
    pub fn empty(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            total_size_bytes: 0.0,
            total_line_count: 0,
        }
    }

    /// A bucket holding a single entry
    pub fn from_entry(entry: &FileEntry) -> Self {
        Self {
            extension: entry.extension.clone(),
            total_size_bytes: entry.size_bytes,
            total_line_count: entry.line_count,
        }
    }

    /// Adds another bucket of the same extension into this one
    ///
    /// Merging is associative and commutative, so buckets built from
    /// disjoint subsets of entries can be combined in any order.
    pub fn merge(&mut self, other: &AggregateBucket) {
        debug_assert_eq!(self.extension, other.extension);
        self.total_size_bytes += other.total_size_bytes;
        self.total_line_count += other.total_line_count;
    }
}

/// Groups entries by extension, summing sizes and line counts
///
/// Buckets appear in order of each extension's first occurrence.
pub fn aggregate(entries: &[FileEntry]) -> Vec<AggregateBucket> {
    let mut buckets: Vec<AggregateBucket> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        match index.get(entry.extension.as_str()) {
            Some(&i) => buckets[i].merge(&AggregateBucket::from_entry(entry)),
            None => {
                index.insert(entry.extension.as_str(), buckets.len());
                buckets.push(AggregateBucket::from_entry(entry));
            }
        }
    }

    buckets
}
