//! SQLite result cache
//!
//! Persists aggregated results so that separate runs of the command-line
//! tool share them. Values are stored as JSON, expiry as Unix milliseconds.
//! Expired rows are purged whenever the database is opened, and a bounded
//! cache evicts the lowest-priority, soonest-expiring rows on insert.

use crate::aggregate::AggregateBucket;
use crate::cache::{CacheEntry, CacheError, CacheResult, ResultCache};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQL schema for the cache database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS result_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at INTEGER NOT NULL,
    priority INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_result_cache_expires ON result_cache(expires_at);
"#;

/// Initializes the cache schema
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// SQLite cache backend
pub struct SqliteCache {
    conn: Mutex<Connection>,
    capacity: usize,
}

impl SqliteCache {
    /// Opens or creates the cache database at `path`
    ///
    /// Rows that expired since the last run are deleted before the cache is
    /// returned.
    pub fn open(path: &Path) -> CacheResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        let cache = Self {
            conn: Mutex::new(conn),
            capacity: usize::MAX,
        };

        let purged = cache.purge_expired()?;
        if purged > 0 {
            tracing::debug!("Purged {} expired cache rows from {}", purged, path.display());
        }

        Ok(cache)
    }

    /// Creates an in-memory database (for testing)
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            capacity: usize::MAX,
        })
    }

    /// Bounds the cache to `capacity` rows
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Looks up `key` as of `now`, deleting the row when expired
    pub fn get_at(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> CacheResult<Option<Vec<AggregateBucket>>> {
        let conn = self.conn.lock().map_err(|_| CacheError::Poisoned)?;

        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, expires_at FROM result_cache WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };

        if now.timestamp_millis() >= expires_at {
            tracing::debug!("Cached result for {} expired", key);
            conn.execute("DELETE FROM result_cache WHERE key = ?1", params![key])?;
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&value)?))
    }

    /// Stores `value` under `key` as of `now`, replacing any previous row
    pub fn put_at(
        &self,
        key: &str,
        value: &[AggregateBucket],
        now: DateTime<Utc>,
    ) -> CacheResult<()> {
        let entry = CacheEntry::new(key, value.to_vec(), now);
        let json = serde_json::to_string(&entry.value)?;

        let conn = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO result_cache (key, value, created_at, expires_at, priority)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.key,
                json,
                now.to_rfc3339(),
                entry.expires_at.timestamp_millis(),
                entry.priority.as_i64()
            ],
        )?;

        evict_over_capacity(&conn, self.capacity, key, now)
    }

    /// Deletes every row expired as of `now`, returning how many were removed
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> CacheResult<usize> {
        let conn = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        let removed = conn.execute(
            "DELETE FROM result_cache WHERE expires_at <= ?1",
            params![now.timestamp_millis()],
        )?;
        Ok(removed)
    }

    /// Deletes every expired row
    pub fn purge_expired(&self) -> CacheResult<usize> {
        self.purge_expired_at(Utc::now())
    }

    /// Number of stored rows, including expired ones not yet purged
    pub fn count(&self) -> CacheResult<u64> {
        let conn = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM result_cache", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl ResultCache for SqliteCache {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<AggregateBucket>>> {
        self.get_at(key, Utc::now())
    }

    fn put(&self, key: &str, value: &[AggregateBucket]) -> CacheResult<()> {
        self.put_at(key, value, Utc::now())
    }
}

/// Drops expired rows, then the lowest-priority rows other than `kept_key`,
/// until at most `capacity` rows remain
fn evict_over_capacity(
    conn: &Connection,
    capacity: usize,
    kept_key: &str,
    now: DateTime<Utc>,
) -> CacheResult<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM result_cache", [], |row| row.get(0))?;
    if (count as u64) <= capacity as u64 {
        return Ok(());
    }

    conn.execute(
        "DELETE FROM result_cache WHERE expires_at <= ?1 AND key != ?2",
        params![now.timestamp_millis(), kept_key],
    )?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM result_cache", [], |row| row.get(0))?;
    let excess = count - capacity as i64;
    if excess > 0 {
        let evicted = conn.execute(
            "DELETE FROM result_cache WHERE key IN (
                SELECT key FROM result_cache WHERE key != ?1
                ORDER BY priority ASC, expires_at ASC LIMIT ?2
            )",
            params![kept_key, excess],
        )?;
        tracing::debug!("Evicted {} cached results over capacity {}", evicted, capacity);
    }

    Ok(())
}
