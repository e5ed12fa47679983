//! Scrape orchestration
//!
//! The orchestrator is the public entry point: it answers a repository
//! request from the cache when possible, and otherwise walks the tree,
//! aggregates the files and stores the result.
//!
//! Concurrent requests for the same uncached repository share one walk: the
//! first caller takes a per-repository gate, later callers wait on it and
//! then find the result in the cache.

use crate::aggregate::{aggregate, AggregateBucket};
use crate::cache::{build_cache, ResultCache};
use crate::config::Config;
use crate::crawler::{build_walker, TreeWalker};
use crate::repository::RepositoryId;
use crate::{CensusError, ScrapeError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

type Gate = Arc<AsyncMutex<()>>;

/// Composes cache, tree walker and aggregator
pub struct ScrapeOrchestrator {
    walker: TreeWalker,
    cache: Arc<dyn ResultCache>,
    in_flight: Mutex<HashMap<String, Gate>>,
}

impl ScrapeOrchestrator {
    /// Creates an orchestrator around an injected cache
    pub fn new(walker: TreeWalker, cache: Arc<dyn ResultCache>) -> Self {
        Self {
            walker,
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the per-extension totals for `repository`
    ///
    /// # Arguments
    ///
    /// * `repository` - Repository identifier, `owner/name`
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<AggregateBucket>)` - Cached or freshly computed buckets
    /// * `Err(ScrapeError)` - Invalid identifier or failed walk; nothing is cached
    pub async fn get_result(&self, repository: &str) -> Result<Vec<AggregateBucket>, ScrapeError> {
        let repository = RepositoryId::parse(repository)?;
        let key = repository.key();

        if let Some(hit) = self.cached(&key) {
            tracing::info!("Cache hit for {}", key);
            return Ok(hit);
        }

        let gate = self.gate_for(&key);
        let result = {
            let _guard = gate.lock().await;

            // A caller that held the gate before us may have filled the cache
            match self.cached(&key) {
                Some(hit) => {
                    tracing::info!("Cache filled by concurrent walk for {}", key);
                    Ok(hit)
                }
                None => self.compute(&repository).await,
            }
        };
        self.release_gate(&key, gate);

        result
    }

    /// Walks `repository` again, ignoring any cached result
    ///
    /// The fresh result replaces the cached one.
    pub async fn refresh(&self, repository: &str) -> Result<Vec<AggregateBucket>, ScrapeError> {
        let repository = RepositoryId::parse(repository)?;
        let key = repository.key();

        let gate = self.gate_for(&key);
        let result = {
            let _guard = gate.lock().await;
            self.compute(&repository).await
        };
        self.release_gate(&key, gate);

        result
    }

    /// Walk, aggregate and store
    async fn compute(&self, repository: &RepositoryId) -> Result<Vec<AggregateBucket>, ScrapeError> {
        let key = repository.key();
        tracing::info!("Cache miss for {}, walking repository", key);

        let entries = self.walker.walk(&repository.start_path()).await?;
        let buckets = aggregate(&entries);

        tracing::info!(
            "{}: {} files in {} extension buckets",
            key,
            entries.len(),
            buckets.len()
        );

        if let Err(e) = self.cache.put(&key, &buckets) {
            tracing::warn!("Failed to cache result for {}: {}", key, e);
        }

        Ok(buckets)
    }

    /// Cache lookup where a failing cache counts as a miss
    fn cached(&self, key: &str) -> Option<Vec<AggregateBucket>> {
        match self.cache.get(key) {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("Cache lookup for {} failed: {}", key, e);
                None
            }
        }
    }

    fn gate_for(&self, key: &str) -> Gate {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(in_flight.entry(key.to_string()).or_default())
    }

    /// Drops the gate once no other caller holds or waits on it
    fn release_gate(&self, key: &str, gate: Gate) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = in_flight.get(key) {
            // One reference in the map, one held here
            if Arc::ptr_eq(current, &gate) && Arc::strong_count(&gate) == 2 {
                in_flight.remove(key);
            }
        }
    }

    /// Number of repositories with a walk in progress or queued
    pub fn in_flight_count(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Runs a complete census for one repository
///
/// This is the main entry point for library users. It will:
/// 1. Build the result cache described by the configuration
/// 2. Build the HTTP client, selectors and tree walker
/// 3. Return the cached result or walk and aggregate the repository
///
/// # Example
///
/// ```no_run
/// use repo_census::{census, Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let buckets = census(&Config::default(), "rust-lang/log", false).await?;
/// for bucket in buckets {
///     println!("{}: {} lines", bucket.extension, bucket.total_line_count);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn census(
    config: &Config,
    repository: &str,
    refresh: bool,
) -> Result<Vec<AggregateBucket>, CensusError> {
    let cache = build_cache(&config.cache)?;
    let walker = build_walker(config)?;
    let orchestrator = ScrapeOrchestrator::new(walker, cache);

    let buckets = if refresh {
        orchestrator.refresh(repository).await?
    } else {
        orchestrator.get_result(repository).await?
    };

    Ok(buckets)
}
