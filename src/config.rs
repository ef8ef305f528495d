//! Configuration Module
//!
//! Cache construction parameters and loading them from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::EvictionPolicy;
use crate::error::{CacheError, Result};

// == Defaults ==
const DEFAULT_MAX_SIZE: usize = 1000;
const DEFAULT_MAX_MEMORY_BYTES: usize = 100 * 1024 * 1024;
const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;
const DEFAULT_METRICS_INTERVAL_SECS: u64 = 30;
const DEFAULT_SERVER_PORT: u16 = 3000;

// == Cache Config ==
/// Parameters for one logical cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of resident entries
    pub max_size: usize,
    /// Memory budget, checked against the lagging size estimate
    pub max_memory_bytes: usize,
    /// TTL used when `put` gets none, None = entries never expire
    pub default_ttl: Option<Duration>,
    /// Victim selection strategy
    pub eviction_policy: EvictionPolicy,
    /// Period of the expiry sweep
    pub cleanup_interval: Duration,
    /// Period of the size/entry-count refresh
    pub metrics_interval: Duration,
    /// Scores at most this many least recently used items under the Adaptive policy
    pub adaptive_scan_limit: Option<usize>,
}

impl CacheConfig {
    /// Creates a config with the given entry cap and defaults for everything else.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }

    pub fn with_max_memory_bytes(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = bytes;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    pub fn with_metrics_interval(mut self, interval: Duration) -> Self {
        self.metrics_interval = interval;
        self
    }

    pub fn with_adaptive_scan_limit(mut self, limit: Option<usize>) -> Self {
        self.adaptive_scan_limit = limit;
        self
    }

    // == Validate ==
    /// Rejects parameters the cache cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than 0".to_string(),
            ));
        }
        if self.max_memory_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max_memory_bytes must be greater than 0".to_string(),
            ));
        }
        if self.cleanup_interval.is_zero() || self.metrics_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "maintenance intervals must be greater than 0".to_string(),
            ));
        }
        if self.adaptive_scan_limit == Some(0) {
            return Err(CacheError::InvalidConfig(
                "adaptive_scan_limit must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            default_ttl: Some(Duration::from_secs(DEFAULT_TTL_SECS)),
            eviction_policy: EvictionPolicy::Lru,
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            metrics_interval: Duration::from_secs(DEFAULT_METRICS_INTERVAL_SECS),
            adaptive_scan_limit: None,
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Parameters of the served cache
    pub cache: CacheConfig,
    /// HTTP server port for the admin endpoints
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `MAX_MEMORY_BYTES` - Memory budget in bytes (default: 104857600)
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 disables expiry (default: 3600)
    /// - `EVICTION_POLICY` - `lru`, `cost` or `adaptive` (default: lru)
    /// - `CLEANUP_INTERVAL` - Expiry sweep period in seconds (default: 60)
    /// - `METRICS_INTERVAL` - Metrics refresh period in seconds (default: 30)
    /// - `ADAPTIVE_SCAN_LIMIT` - Max items scored per Adaptive eviction (default: unset)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let default_ttl = env_or("DEFAULT_TTL", DEFAULT_TTL_SECS);

        Self {
            cache: CacheConfig {
                max_size: env_or("MAX_SIZE", DEFAULT_MAX_SIZE),
                max_memory_bytes: env_or("MAX_MEMORY_BYTES", DEFAULT_MAX_MEMORY_BYTES),
                default_ttl: (default_ttl > 0).then(|| Duration::from_secs(default_ttl)),
                eviction_policy: env_or("EVICTION_POLICY", EvictionPolicy::Lru),
                cleanup_interval: Duration::from_secs(env_or(
                    "CLEANUP_INTERVAL",
                    DEFAULT_CLEANUP_INTERVAL_SECS,
                )),
                metrics_interval: Duration::from_secs(env_or(
                    "METRICS_INTERVAL",
                    DEFAULT_METRICS_INTERVAL_SECS,
                )),
                adaptive_scan_limit: env::var("ADAPTIVE_SCAN_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok()),
            },
            server_port: env_or("SERVER_PORT", DEFAULT_SERVER_PORT),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

/// Parses an environment variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
