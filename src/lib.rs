//! Result Cache - An in-process cache for expensive computation results
//!
//! Bounds entry count and approximate memory, expires entries by TTL, evicts
//! with LRU, Cost or Adaptive policies, and memoizes async operations.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{cached, AdvancedCache, EvictionPolicy, MetricsSnapshot};
pub use config::{CacheConfig, Config};
pub use error::CacheError;
