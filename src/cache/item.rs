//! Cache Item Module
//!
//! Defines the value container stored for every key, with the metadata
//! the eviction policies and expiry checks read.

use std::time::{Duration, Instant};

use serde::Serialize;

// == Cache Item ==
/// A stored value together with its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheItem<V> {
    /// The key this item is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Absolute expiry instant, None = never expires
    pub expiry: Option<Instant>,
    /// Caller-supplied cost, always >= 0
    pub cost: f64,
    /// When the item was inserted (or last overwritten)
    pub created_at: Instant,
    /// Last successful read, equals `created_at` until the first hit
    pub last_access: Instant,
    /// Number of successful reads
    pub access_count: u64,
}

impl<V> CacheItem<V> {
    // == Constructor ==
    /// Creates a fresh item at `now`.
    ///
    /// # Arguments
    /// * `key` - The key the item is stored under
    /// * `value` - The value to store
    /// * `ttl` - Optional time-to-live, counted from `now`; a TTL too large to
    ///   represent as an instant never expires
    /// * `cost` - Non-negative cost used by the Cost and Adaptive policies
    /// * `now` - Current instant from the cache clock
    pub fn new(key: String, value: V, ttl: Option<Duration>, cost: f64, now: Instant) -> Self {
        Self {
            key,
            value,
            expiry: ttl.and_then(|ttl| now.checked_add(ttl)),
            cost,
            created_at: now,
            last_access: now,
            access_count: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the item is stale at `now`.
    ///
    /// An item is expired only once `now` is strictly past its expiry.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expiry {
            Some(expiry) => now > expiry,
            None => false,
        }
    }

    // == Record Access ==
    /// Marks a successful read at `now`.
    pub fn record_access(&mut self, now: Instant) {
        self.last_access = now;
        self.access_count += 1;
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, `Some(ZERO)` once expired, None without expiry.
    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        self.expiry
            .map(|expiry| expiry.saturating_duration_since(now))
    }

    // == Info ==
    /// Describes the item's metadata at `now`, without the value.
    pub fn info(&self, now: Instant) -> EntryInfo {
        EntryInfo {
            key: self.key.clone(),
            cost: self.cost,
            access_count: self.access_count,
            age_secs: now.saturating_duration_since(self.created_at).as_secs_f64(),
            idle_secs: now.saturating_duration_since(self.last_access).as_secs_f64(),
            ttl_remaining_secs: self.ttl_remaining(now).map(|ttl| ttl.as_secs_f64()),
            expired: self.is_expired(now),
        }
    }
}

// == Entry Info ==
/// Value-free view of an item's metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryInfo {
    pub key: String,
    pub cost: f64,
    pub access_count: u64,
    pub age_secs: f64,
    pub idle_secs: f64,
    pub ttl_remaining_secs: Option<f64>,
    pub expired: bool,
}
