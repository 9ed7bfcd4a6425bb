//! Aggregated rate caching.

use dashmap::DashMap;
use ratefold_common::{CacheKey, RatesResult};
use std::sync::Arc;
use tracing::debug;

/// Thread-safe cache of aggregated results.
///
/// Entries live until [`clear`](RateCache::clear) or process exit; there is
/// no TTL and no eviction. Two concurrent misses on the same key may both
/// insert, the last write wins.
pub struct RateCache {
    cache: DashMap<CacheKey, RatesResult>,
}

impl RateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Get a cached result.
    pub fn get(&self, key: &CacheKey) -> Option<RatesResult> {
        match self.cache.get(key) {
            Some(entry) => {
                debug!(key = %key, "Cache hit");
                Some(entry.value().clone())
            }
            None => {
                debug!(key = %key, "Cache miss");
                None
            }
        }
    }

    /// Insert a result, replacing any previous entry for the key.
    pub fn insert(&self, key: CacheKey, result: RatesResult) {
        self.cache.insert(key, result);
    }

    /// Check whether a key is cached.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains_key(key)
    }

    /// Clear all cached results.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of entries in cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared rate cache.
pub type SharedRateCache = Arc<RateCache>;
