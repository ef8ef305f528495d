//! Memoization Module
//!
//! Get-or-compute wrappers for idempotent async operations, built only on
//! the public `AdvancedCache` API.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::AdvancedCache;
use crate::error::{CacheError, Result};

// == Cached ==
/// Creates a memoizer that stores results in `cache` with the given TTL and cost.
///
/// Fails with `CacheError::InvalidCost` if `cost` is negative or not finite.
pub fn cached<V>(cache: AdvancedCache<V>, ttl: Option<Duration>, cost: f64) -> Result<Memoizer<V>> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(CacheError::InvalidCost(cost));
    }
    Ok(Memoizer { cache, ttl, cost })
}

// == Memoizer ==
/// Shared settings for memoized operations over one cache.
pub struct Memoizer<V> {
    cache: AdvancedCache<V>,
    ttl: Option<Duration>,
    cost: f64,
}

impl<V> Memoizer<V>
where
    V: Clone + Send + 'static,
{
    /// Wraps `f` so calls are answered from the cache when possible.
    ///
    /// `operation` names the wrapped function and is part of every key, so
    /// different operations never share entries.
    pub fn wrap<F>(&self, operation: impl Into<String>, f: F) -> Memoized<V, F> {
        Memoized {
            memoizer: self.clone(),
            operation: operation.into(),
            f,
        }
    }

    /// Returns the cached result for `(operation, args)` or runs `compute`.
    ///
    /// Errors from `compute` are returned unchanged and never stored.
    pub async fn get_or_compute<A, Fut, E>(
        &self,
        operation: &str,
        args: &A,
        compute: impl FnOnce() -> Fut,
    ) -> std::result::Result<V, E>
    where
        A: Serialize + ?Sized,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let key = self.key_for(operation, args);
        self.run(key, compute).await
    }

    fn key_for<A: Serialize + ?Sized>(&self, operation: &str, args: &A) -> Option<String> {
        match derive_key(operation, args) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(
                    operation = %operation,
                    error = %err,
                    "Arguments not serializable, bypassing cache"
                );
                None
            }
        }
    }

    async fn run<Fut, E>(
        &self,
        key: Option<String>,
        compute: impl FnOnce() -> Fut,
    ) -> std::result::Result<V, E>
    where
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let Some(key) = key else {
            return compute().await;
        };

        if let Some(hit) = self.cache.get(&key).await {
            debug!(key = %key, "Memoized result served from cache");
            return Ok(hit);
        }

        let value = compute().await?;
        // Cost was validated by `cached`, so a failed store is logged and the
        // computed value is still returned.
        if let Err(err) = self
            .cache
            .put(key.clone(), value.clone(), self.ttl, self.cost)
            .await
        {
            warn!(key = %key, error = %err, "Failed to store memoized result");
        }

        Ok(value)
    }
}

impl<V> Clone for Memoizer<V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            ttl: self.ttl,
            cost: self.cost,
        }
    }
}

// == Memoized ==
/// A wrapped operation; see `Memoizer::wrap`.
pub struct Memoized<V, F> {
    memoizer: Memoizer<V>,
    operation: String,
    f: F,
}

impl<V, F> Memoized<V, F>
where
    V: Clone + Send + 'static,
{
    /// Calls the wrapped operation through the cache.
    pub async fn call<A, Fut, E>(&self, args: A) -> std::result::Result<V, E>
    where
        A: Serialize,
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let key = self.memoizer.key_for(&self.operation, &args);
        self.memoizer.run(key, || (self.f)(args)).await
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

// == Derive Key ==
/// Builds a stable cache key for `operation` called with `args`.
///
/// Scalar arguments are embedded directly as JSON (`op:5`, `op:"5"`).
/// Anything else is canonicalized with sorted object keys and hashed with
/// SHA-256, so logically equal arguments map to the same key across runs.
pub fn derive_key<A: Serialize + ?Sized>(
    operation: &str,
    args: &A,
) -> std::result::Result<String, serde_json::Error> {
    let canonical = canonicalize(serde_json::to_value(args)?);

    match canonical {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Ok(format!("{}:{}", operation, canonical))
        }
        Value::Array(_) | Value::Object(_) => {
            let encoded = serde_json::to_vec(&canonical)?;
            let mut hasher = Sha256::new();
            hasher.update(operation.as_bytes());
            hasher.update(b":");
            hasher.update(&encoded);
            Ok(format!("{}:{:x}", operation, hasher.finalize()))
        }
    }
}

/// Rebuilds every object with its keys in sorted order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, canonicalize(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        scalar => scalar,
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::CacheConfig;

    #[derive(Serialize)]
    struct Query {
        zone: String,
        load: f64,
    }

    fn memoizer() -> Memoizer<i64> {
        let cache = AdvancedCache::new(CacheConfig::new(100)).unwrap();
        cached(cache, None, 1.0).unwrap()
    }

    #[test]
    fn test_derive_key_scalars_are_direct() {
        assert_eq!(derive_key("double", &5).unwrap(), "double:5");
        assert_eq!(derive_key("double", "5").unwrap(), "double:\"5\"");
        assert_eq!(derive_key("double", &()).unwrap(), "double:null");
    }

    #[test]
    fn test_derive_key_is_order_independent() {
        let mut first = HashMap::new();
        let mut second = HashMap::new();
        for i in 0..32 {
            first.insert(format!("k{}", i), i);
        }
        for i in (0..32).rev() {
            second.insert(format!("k{}", i), i);
        }

        assert_eq!(
            derive_key("op", &first).unwrap(),
            derive_key("op", &second).unwrap()
        );
    }

    #[test]
    fn test_derive_key_separates_operations_and_args() {
        let query = Query {
            zone: "a".to_string(),
            load: 1.5,
        };
        let other = Query {
            zone: "b".to_string(),
            load: 1.5,
        };

        let key = derive_key("load_calc", &query).unwrap();
        assert!(key.starts_with("load_calc:"));
        assert_eq!(key.len(), "load_calc:".len() + 64);
        assert_ne!(key, derive_key("other_calc", &query).unwrap());
        assert_ne!(key, derive_key("load_calc", &other).unwrap());
        assert_eq!(key, derive_key("load_calc", &query).unwrap());
    }

    #[test]
    fn test_derive_key_rejects_unserializable_args() {
        let mut args: HashMap<(u8, u8), u8> = HashMap::new();
        args.insert((1, 2), 3);
        assert!(derive_key("op", &args).is_err());
    }

    #[tokio::test]
    async fn test_cached_rejects_invalid_cost() {
        let cache: AdvancedCache<i64> = AdvancedCache::new(CacheConfig::new(10)).unwrap();
        assert!(matches!(
            cached(cache, None, -2.0),
            Err(CacheError::InvalidCost(_))
        ));
    }

    #[tokio::test]
    async fn test_wrapped_function_runs_once_per_argument() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let double = memoizer().wrap("double", move |x: i64| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<i64, String>(x * 2)
            }
        });

        assert_eq!(double.call(5).await, Ok(10));
        assert_eq!(double.call(5).await, Ok(10));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(double.call(6).await, Ok(12));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(double.operation(), "double");
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let failing = memoizer().wrap("failing", move |x: i64| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i64, String>(format!("cannot compute {}", x))
            }
        });

        assert_eq!(failing.call(1).await, Err("cannot compute 1".to_string()));
        assert_eq!(failing.call(1).await, Err("cannot compute 1".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_or_compute_with_struct_args() {
        let memo = memoizer();
        let query = Query {
            zone: "north".to_string(),
            load: 2.0,
        };

        let first: std::result::Result<i64, ()> =
            memo.get_or_compute("load", &query, || async { Ok(7) }).await;
        let second: std::result::Result<i64, ()> = memo
            .get_or_compute("load", &query, || async { Ok(99) })
            .await;

        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
    }

    #[tokio::test]
    async fn test_unserializable_args_bypass_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = memoizer();
        let mut args: HashMap<(u8, u8), u8> = HashMap::new();
        args.insert((1, 2), 3);

        for _ in 0..2 {
            let counter = Arc::clone(&calls);
            let result: std::result::Result<i64, ()> = memo
                .get_or_compute("op", &args, || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await;
            assert_eq!(result, Ok(1));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
