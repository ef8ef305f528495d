//! Advanced Cache Module
//!
//! Thread-safe cache handle: one lock around the store, plus the expiry and
//! metrics loops that run for as long as any handle is alive.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cache::{
    CacheStore, Clock, EntryInfo, JsonSizeEstimator, MetricsSnapshot, SizeEstimator, SystemClock,
    DEFAULT_COST,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_expiry_task, spawn_metrics_task, MaintenanceTasks};

/// Store shared between cache handles and the maintenance loops.
pub type SharedStore<V> = Arc<Mutex<CacheStore<V>>>;

// == Advanced Cache ==
/// Bounded, TTL-aware cache shared by concurrent callers.
///
/// Every operation takes the same lock for its whole duration, eviction
/// scoring included. Clones share the store and the maintenance loops; the
/// loops are cancelled when the last clone is dropped or on `shutdown`.
///
/// # Example
/// ```no_run
/// use result_cache::{cache::AdvancedCache, config::CacheConfig};
///
/// # async fn demo() -> result_cache::error::Result<()> {
/// let cache: AdvancedCache<u64> = AdvancedCache::new(CacheConfig::new(1000))?;
/// cache.insert("answer".to_string(), 42).await?;
/// assert_eq!(cache.get("answer").await, Some(42));
/// # Ok(())
/// # }
/// ```
pub struct AdvancedCache<V> {
    store: SharedStore<V>,
    tasks: Arc<MaintenanceTasks>,
}

impl<V> AdvancedCache<V>
where
    V: Serialize + Send + 'static,
{
    // == Constructor ==
    /// Creates a cache using the JSON size estimator and the system clock.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_estimator(config, JsonSizeEstimator::new())
    }
}

impl<V> AdvancedCache<V>
where
    V: Send + 'static,
{
    /// Creates a cache with a custom size estimator.
    pub fn with_estimator(
        config: CacheConfig,
        estimator: impl SizeEstimator<V> + 'static,
    ) -> Result<Self> {
        Self::with_clock(config, estimator, SystemClock)
    }

    /// Creates a cache with a custom size estimator and clock.
    ///
    /// Fails with `CacheError::InvalidConfig` for out-of-range parameters and
    /// `CacheError::Runtime` when no tokio runtime is available to run the
    /// maintenance loops.
    pub fn with_clock(
        config: CacheConfig,
        estimator: impl SizeEstimator<V> + 'static,
        clock: impl Clock,
    ) -> Result<Self> {
        tokio::runtime::Handle::try_current()
            .map_err(|err| CacheError::Runtime(err.to_string()))?;

        let cleanup_interval = config.cleanup_interval;
        let metrics_interval = config.metrics_interval;
        let policy = config.eviction_policy;
        let max_size = config.max_size;

        let store = CacheStore::with_parts(config, Arc::new(estimator), Arc::new(clock))?;
        let store: SharedStore<V> = Arc::new(Mutex::new(store));

        let token = CancellationToken::new();
        let tasks = MaintenanceTasks::new(token.clone());
        tasks.push(spawn_expiry_task(
            Arc::clone(&store),
            cleanup_interval,
            token.child_token(),
        ));
        tasks.push(spawn_metrics_task(
            Arc::clone(&store),
            metrics_interval,
            token.child_token(),
        ));

        info!(
            "Cache created: max_size={}, policy={}, cleanup_interval={:?}, metrics_interval={:?}",
            max_size, policy, cleanup_interval, metrics_interval
        );

        Ok(Self {
            store,
            tasks: Arc::new(tasks),
        })
    }

    // == Get ==
    /// Returns a copy of the live value under `key`, counting a hit or miss.
    pub async fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.store.lock().await.get(key)
    }

    // == Put ==
    /// Stores `value` with an optional TTL and a cost.
    ///
    /// See `CacheStore::put` for the eviction rules.
    pub async fn put(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Option<Duration>,
        cost: f64,
    ) -> Result<bool> {
        self.store.lock().await.put(key.into(), value, ttl, cost)
    }

    /// Stores `value` with the default TTL and cost.
    pub async fn insert(&self, key: impl Into<String>, value: V) -> Result<bool> {
        self.put(key, value, None, DEFAULT_COST).await
    }

    // == Cleanup Expired ==
    /// Sweeps expired entries now; returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.lock().await.cleanup_expired()
    }

    // == Refresh Metrics ==
    /// Recomputes the size gauges now; returns how many values were skipped.
    pub async fn refresh_metrics(&self) -> usize {
        self.store.lock().await.refresh_metrics()
    }

    // == Get Metrics ==
    pub async fn get_metrics(&self) -> MetricsSnapshot {
        self.store.lock().await.metrics()
    }

    // == Clear ==
    /// Empties the cache and zeroes all metrics in one step.
    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.store.lock().await.contains_key(key)
    }

    pub async fn inspect(&self, key: &str) -> Option<EntryInfo> {
        self.store.lock().await.inspect(key)
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    // == Shutdown ==
    /// Stops both maintenance loops and waits for them to exit.
    ///
    /// The cache stays usable afterwards; only background upkeep stops.
    pub async fn shutdown(&self) {
        self.tasks.shutdown().await;
    }

    /// Returns true once the maintenance loops have been told to stop.
    pub fn is_shut_down(&self) -> bool {
        self.tasks.is_cancelled()
    }
}

impl<V> Clone for AdvancedCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tasks: Arc::clone(&self.tasks),
        }
    }
}
