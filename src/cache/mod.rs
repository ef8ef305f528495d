//! Cache Module
//!
//! Bounded in-process result cache with TTL expiry, memory budget, pluggable
//! eviction policies and memoization helpers.

mod advanced;
mod clock;
mod item;
mod memoize;
mod metrics;
mod policy;
mod recency;
mod size;
mod store;


// Re-export public types
pub use advanced::{AdvancedCache, SharedStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use item::{CacheItem, EntryInfo};
pub use memoize::{cached, derive_key, Memoized, Memoizer};
pub use metrics::{CacheMetrics, MetricsSnapshot};
pub use policy::{adaptive_score, EvictionPolicy};
pub use recency::RecencyIndex;
pub use size::{
    FnSizeEstimator, JsonSizeEstimator, ShallowSizeEstimator, SizeEstimateError, SizeEstimator,
};
pub use store::{CacheStore, DEFAULT_COST};
