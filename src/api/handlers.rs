//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{AdvancedCache, EntryInfo, MetricsSnapshot};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{CleanupResponse, ClearResponse, HealthResponse};

/// Application state shared across all handlers.
///
/// The service caches JSON results; the handle is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Shared result cache
    pub cache: AdvancedCache<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: AdvancedCache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Must run inside a tokio runtime, since the cache starts its
    /// maintenance loops immediately.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = AdvancedCache::new(config.cache.clone())?;
        Ok(Self::new(cache))
    }
}

/// Handler for GET /metrics
///
/// Returns the current metrics snapshot. Size gauges reflect the last
/// background refresh.
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.cache.get_metrics().await)
}

/// Handler for GET /entries/:key
///
/// Returns an entry's metadata without counting a read.
pub async fn entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryInfo>> {
    state
        .cache
        .inspect(&key)
        .await
        .map(Json)
        .ok_or(CacheError::NotFound(key))
}

/// Handler for POST /cleanup
///
/// Runs an expiry sweep immediately.
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let removed = state.cache.cleanup_expired().await;
    let remaining = state.cache.len().await;
    Json(CleanupResponse::new(removed, remaining))
}

/// Handler for DELETE /cache
///
/// Drops every entry and zeroes the metrics.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear().await;
    Json(ClearResponse::new())
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(!state.cache.is_shut_down()))
}
