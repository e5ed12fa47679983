//! In-memory result cache

use crate::aggregate::AggregateBucket;
use crate::cache::{CacheEntry, CacheError, CacheResult, ResultCache};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local cache guarded by a mutex
///
/// When the cache holds `capacity` entries, inserting a new key first drops
/// expired entries, then the entry with the lowest priority and earliest
/// expiry.
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    capacity: usize,
}

impl MemoryCache {
    /// An unbounded cache
    pub fn new() -> Self {
        Self::with_capacity(usize::MAX)
    }

    /// A cache holding at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Number of stored entries, including expired ones not yet dropped
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up `key` as of `now`, dropping it when expired
    pub fn get_at(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> CacheResult<Option<Vec<AggregateBucket>>> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;

        let expired_at = match entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired_at(now) => return Ok(Some(entry.value.clone())),
            Some(entry) => entry.expires_at,
        };

        tracing::debug!("Cache entry for {} expired at {}", key, expired_at);
        entries.remove(key);
        Ok(None)
    }

    /// Stores `value` under `key` as of `now`
    pub fn put_at(
        &self,
        key: &str,
        value: &[AggregateBucket],
        now: DateTime<Utc>,
    ) -> CacheResult<()> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;

        if !entries.contains_key(key) && entries.len() >= self.capacity {
            entries.retain(|_, entry| !entry.is_expired_at(now));

            if entries.len() >= self.capacity {
                let victim = entries
                    .values()
                    .min_by_key(|entry| (entry.priority, entry.expires_at))
                    .map(|entry| entry.key.clone());

                if let Some(victim) = victim {
                    tracing::debug!("Evicting cached result for {}", victim);
                    entries.remove(&victim);
                }
            }
        }

        entries.insert(key.to_string(), CacheEntry::new(key, value.to_vec(), now));
        Ok(())
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<AggregateBucket>>> {
        self.get_at(key, Utc::now())
    }

    fn put(&self, key: &str, value: &[AggregateBucket]) -> CacheResult<()> {
        self.put_at(key, value, Utc::now())
    }
}
