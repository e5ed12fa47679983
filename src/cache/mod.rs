//! Result cache
//!
//! Aggregated results are cached per repository for a fixed 24 hours so that
//! repeated requests do not walk the whole tree again. The cache is a trait so
//! that callers can inject either backend:
//! - [`MemoryCache`] keeps entries for the lifetime of the process
//! - [`SqliteCache`] persists entries in a SQLite file across runs

mod memory;
mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use crate::aggregate::AggregateBucket;
use crate::config::CacheConfig;
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// How long a cached result stays valid
pub fn result_ttl() -> Duration {
    Duration::hours(24)
}

/// Eviction preference of a cache entry
///
/// Only consulted when a bounded cache is full; it never changes whether a
/// fresh entry is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EvictionPriority {
    Low = 0,
    Normal = 1,
    High = 2,
}

impl EvictionPriority {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// A cached result with its expiry
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub value: Vec<AggregateBucket>,
    pub expires_at: DateTime<Utc>,
    pub priority: EvictionPriority,
}

impl CacheEntry {
    /// Creates an entry expiring one TTL after `now`
    pub fn new(key: &str, value: Vec<AggregateBucket>, now: DateTime<Utc>) -> Self {
        Self {
            key: key.to_string(),
            value,
            expires_at: now + result_ttl(),
            priority: EvictionPriority::Low,
        }
    }

    /// Whether the entry must be treated as absent at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Key-value store of aggregated results with a fixed TTL
pub trait ResultCache: Send + Sync {
    /// Returns the cached value for `key`, or `None` when absent or expired
    fn get(&self, key: &str) -> CacheResult<Option<Vec<AggregateBucket>>>;

    /// Stores `value` under `key`, expiring after [`result_ttl`]
    fn put(&self, key: &str, value: &[AggregateBucket]) -> CacheResult<()>;
}

/// Builds the cache described by configuration
///
/// A configured `database_path` selects the SQLite backend; otherwise an
/// in-memory cache is used. Both are bounded by `max_entries`, and opening
/// the SQLite backend purges rows that expired since the last run.
pub fn build_cache(config: &CacheConfig) -> CacheResult<Arc<dyn ResultCache>> {
    match &config.database_path {
        Some(path) => {
            tracing::info!("Using SQLite result cache at {}", path);
            let cache = SqliteCache::open(Path::new(path))?.with_capacity(config.max_entries);
            Ok(Arc::new(cache))
        }
        None => {
            tracing::debug!("Using in-memory result cache ({} entries)", config.max_entries);
            Ok(Arc::new(MemoryCache::with_capacity(config.max_entries)))
        }
    }
}
