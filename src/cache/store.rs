//! Cache Store Module
//!
//! Main cache engine: keyed item storage with recency ordering, TTL expiry,
//! entry and memory bounds, and metrics. All operations are synchronous and
//! take `&mut self`; `AdvancedCache` puts a lock and the maintenance loops
//! around it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{
    CacheItem, CacheMetrics, Clock, EntryInfo, JsonSizeEstimator, MetricsSnapshot, RecencyIndex,
    SizeEstimator, SystemClock,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Cost assigned by `insert`.
pub const DEFAULT_COST: f64 = 1.0;

// == Cache Store ==
/// Bounded cache storage with pluggable eviction and TTL support.
pub struct CacheStore<V> {
    /// Key-item storage
    items: HashMap<String, CacheItem<V>>,
    /// Keys ordered least to most recently used
    recency: RecencyIndex,
    /// Performance counters and gauges
    metrics: CacheMetrics,
    /// Bounds and policy
    config: CacheConfig,
    /// Per-value size approximation for the memory gauge
    estimator: Arc<dyn SizeEstimator<V>>,
    /// Time source for expiry and eviction scoring
    clock: Arc<dyn Clock>,
}

impl<V: Serialize + 'static> CacheStore<V> {
    // == Constructor ==
    /// Creates a store using the JSON size estimator and the system clock.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_parts(
            config,
            Arc::new(JsonSizeEstimator::new()),
            Arc::new(SystemClock),
        )
    }
}

impl<V> CacheStore<V> {
    /// Creates a store with an explicit estimator and clock.
    ///
    /// Fails with `CacheError::InvalidConfig` when `config` is out of range.
    pub fn with_parts(
        config: CacheConfig,
        estimator: Arc<dyn SizeEstimator<V>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            items: HashMap::new(),
            recency: RecencyIndex::new(),
            metrics: CacheMetrics::new(),
            config,
            estimator,
            clock,
        })
    }

    // == Put ==
    /// Stores a value, replacing any previous item and its metadata.
    ///
    /// Runs one eviction before inserting when the last memory estimate is at
    /// or above budget, and one after inserting when the entry count exceeds
    /// `max_size`.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses `default_ttl` if None)
    /// * `cost` - Finite, non-negative cost
    pub fn put(&mut self, key: String, value: V, ttl: Option<Duration>, cost: f64) -> Result<bool> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(CacheError::InvalidCost(cost));
        }

        if self.metrics.memory_usage_estimate >= self.config.max_memory_bytes {
            self.evict_one();
        }

        let now = self.clock.now();
        let ttl = ttl.or(self.config.default_ttl);
        let item = CacheItem::new(key.clone(), value, ttl, cost, now);

        self.items.insert(key.clone(), item);
        self.recency.touch(&key);

        if self.items.len() > self.config.max_size {
            self.evict_one();
        }

        Ok(true)
    }

    /// Stores a value with the default TTL and cost.
    pub fn insert(&mut self, key: String, value: V) -> Result<bool> {
        self.put(key, value, None, DEFAULT_COST)
    }

    // == Get ==
    /// Retrieves a copy of the value stored under `key`.
    ///
    /// Absent keys count as misses. Expired items are removed on the spot and
    /// also count as misses.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let started = Instant::now();
        let now = self.clock.now();

        let expired = match self.items.get(key) {
            Some(item) => item.is_expired(now),
            None => {
                self.metrics.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.metrics.record_miss();
            debug!(key = %key, "Dropped expired entry on read");
            return None;
        }

        let item = self.items.get_mut(key)?;
        item.record_access(now);
        let value = item.value.clone();
        self.recency.touch(key);
        self.metrics.record_hit(started.elapsed());

        Some(value)
    }

    // == Contains Key ==
    /// Checks for a live item without touching metrics or recency.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.items
            .get(key)
            .is_some_and(|item| !item.is_expired(now))
    }

    // == Inspect ==
    /// Returns an item's metadata without counting a read.
    pub fn inspect(&self, key: &str) -> Option<EntryInfo> {
        let now = self.clock.now();
        self.items.get(key).map(|item| item.info(now))
    }

    // == Evict One ==
    /// Removes the victim chosen by the configured policy.
    ///
    /// Returns the evicted key, or None if the store is empty.
    pub fn evict_one(&mut self) -> Option<String> {
        let now = self.clock.now();
        let policy = self.config.eviction_policy;

        let victim = {
            let candidates = self.recency.iter().filter_map(|key| self.items.get(key));
            policy
                .select_victim(candidates, now, self.config.adaptive_scan_limit)
                .map(str::to_string)
        }?;

        self.remove_entry(&victim);
        self.metrics.record_eviction();
        debug!(key = %victim, policy = %policy, "Evicted cache entry");

        Some(victim)
    }

    // == Cleanup Expired ==
    /// Removes all expired items, counting each as an eviction.
    ///
    /// Returns the number of items removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired_keys: Vec<String> = self
            .items
            .iter()
            .filter(|(_, item)| item.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
            self.metrics.record_eviction();
            debug!(key = %key, "Swept expired entry");
        }

        expired_keys.len()
    }

    // == Refresh Metrics ==
    /// Recomputes the memory estimate and entry-count gauges.
    ///
    /// Values the estimator cannot size are logged and left out of this
    /// round's total. Returns how many values were skipped.
    pub fn refresh_metrics(&mut self) -> usize {
        let mut total_bytes = 0usize;
        let mut skipped = 0usize;

        for item in self.items.values() {
            match self.estimator.estimate(&item.value) {
                Ok(bytes) => total_bytes = total_bytes.saturating_add(bytes),
                Err(err) => {
                    skipped += 1;
                    warn!(key = %item.key, error = %err, "Skipping value in memory estimate");
                }
            }
        }

        self.metrics.set_gauges(total_bytes, self.items.len());
        skipped
    }

    // == Metrics ==
    /// Returns a snapshot of the metrics.
    ///
    /// `memory_usage_estimate` and `cache_size` are as of the last refresh.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // == Clear ==
    /// Drops every item and zeroes all metrics.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recency.clear();
        self.metrics.reset();
    }

    // == Length ==
    /// Returns the current number of resident items, expired ones included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn remove_entry(&mut self, key: &str) {
        self.items.remove(key);
        self.recency.remove(key);
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.items.len())
            .field("metrics", &self.metrics)
            .field("config", &self.config)
            .finish()
    }
}
