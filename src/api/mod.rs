//! API Module
//!
//! Admin HTTP surface for observing and maintaining the cache.
//!
//! # Endpoints
//! - `GET /metrics` - Metrics snapshot
//! - `GET /entries/:key` - Entry metadata
//! - `POST /cleanup` - Run an expiry sweep now
//! - `DELETE /cache` - Clear the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
