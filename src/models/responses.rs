//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies. The metrics and
//! entry endpoints serialize `MetricsSnapshot` and `EntryInfo` directly.

use serde::Serialize;

/// Response body for the sweep endpoint (POST /cleanup)
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    /// Number of expired entries removed
    pub removed: usize,
    /// Entries left afterwards
    pub remaining: usize,
}

impl CleanupResponse {
    pub fn new(removed: usize, remaining: usize) -> Self {
        Self { removed, remaining }
    }
}

/// Response body for the clear endpoint (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
}

impl ClearResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether the background maintenance loops are still running
    pub maintenance_running: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(maintenance_running: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            maintenance_running,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
