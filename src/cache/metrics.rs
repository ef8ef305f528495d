//! Cache Metrics Module
//!
//! Tracks cache performance counters and the gauges refreshed by the
//! background metrics task.

use std::time::Duration;

use serde::Serialize;

// == Cache Metrics ==
/// Counters and gauges aggregated from cache operations.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    /// Successful reads
    pub hits: u64,
    /// Reads of absent or expired keys
    pub misses: u64,
    /// Forced removals (policy evictions and swept expiries)
    pub evictions: u64,
    /// Approximate bytes held by values, as of the last refresh
    pub memory_usage_estimate: usize,
    /// Running mean of hit latency, in seconds
    pub avg_access_time: f64,
    /// Live entry count, as of the last refresh
    pub cache_size: usize,
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates a new CacheMetrics with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Ratio ==
    /// Returns hits / (hits + misses), or 0.0 if nothing has been read yet.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Counts a hit and folds its latency into the running mean.
    pub fn record_hit(&mut self, elapsed: Duration) {
        self.hits += 1;
        let sample = elapsed.as_secs_f64();
        self.avg_access_time += (sample - self.avg_access_time) / self.hits as f64;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Refresh Gauges ==
    /// Stores the outcome of a periodic size pass.
    pub fn set_gauges(&mut self, memory_usage_estimate: usize, cache_size: usize) {
        self.memory_usage_estimate = memory_usage_estimate;
        self.cache_size = cache_size;
    }

    // == Reset ==
    /// Zeroes every counter and gauge.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Snapshot ==
    /// Returns a point-in-time copy for external consumers.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits,
            misses: self.misses,
            hit_ratio: self.hit_ratio(),
            evictions: self.evictions,
            memory_usage_estimate: self.memory_usage_estimate,
            avg_access_time: self.avg_access_time,
            cache_size: self.cache_size,
        }
    }
}

// == Metrics Snapshot ==
/// Serializable view of the metrics, as served to observability consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
    pub evictions: u64,
    pub memory_usage_estimate: usize,
    /// Seconds
    pub avg_access_time: f64,
    pub cache_size: usize,
}
