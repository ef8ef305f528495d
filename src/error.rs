//! Error types for the result cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the result cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Construction parameters out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Item cost is negative or not finite
    #[error("Invalid cost: {0} (must be a finite value >= 0)")]
    InvalidCost(f64),

    /// Background maintenance could not be started
    #[error("Runtime unavailable: {0}")]
    Runtime(String),

    /// Key not present in the cache
    #[error("Key not found: {0}")]
    NotFound(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidConfig(_) | CacheError::InvalidCost(_) => StatusCode::BAD_REQUEST,
            CacheError::Runtime(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the result cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = CacheError::NotFound("k".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_cost_message() {
        let err = CacheError::InvalidCost(-1.0);
        assert!(err.to_string().contains("-1"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
