//! Size Estimation Module
//!
//! Approximates how many bytes a cached value occupies. The numbers feed the
//! memory budget check and are not meant to match real allocator usage.

use std::fmt;
use std::marker::PhantomData;
use std::mem;

use serde::Serialize;
use thiserror::Error;

// == Size Estimate Error ==
/// A value whose size could not be estimated.
#[derive(Error, Debug)]
#[error("size estimation failed: {0}")]
pub struct SizeEstimateError(pub String);

impl From<serde_json::Error> for SizeEstimateError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}

// == Size Estimator ==
/// Approximates the in-memory footprint of a stored value.
pub trait SizeEstimator<V>: Send + Sync {
    /// Returns the approximate size of `value` in bytes.
    fn estimate(&self, value: &V) -> Result<usize, SizeEstimateError>;
}

// == JSON Size Estimator ==
/// Default estimator: inline size of `V` plus the length of its JSON encoding.
pub struct JsonSizeEstimator<V> {
    _marker: PhantomData<fn(&V)>,
}

impl<V> JsonSizeEstimator<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for JsonSizeEstimator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for JsonSizeEstimator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonSizeEstimator")
    }
}

impl<V: Serialize> SizeEstimator<V> for JsonSizeEstimator<V> {
    fn estimate(&self, value: &V) -> Result<usize, SizeEstimateError> {
        let encoded = serde_json::to_vec(value)?;
        Ok(mem::size_of::<V>() + encoded.len())
    }
}

// == Shallow Size Estimator ==
/// Counts only the inline size of `V`; for values without heap data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShallowSizeEstimator;

impl<V> SizeEstimator<V> for ShallowSizeEstimator {
    fn estimate(&self, _value: &V) -> Result<usize, SizeEstimateError> {
        Ok(mem::size_of::<V>())
    }
}

// == Closure Estimator ==
/// Adapts a plain function or closure into a `SizeEstimator`.
pub struct FnSizeEstimator<F>(pub F);

impl<V, F> SizeEstimator<V> for FnSizeEstimator<F>
where
    F: Fn(&V) -> Result<usize, SizeEstimateError> + Send + Sync,
{
    fn estimate(&self, value: &V) -> Result<usize, SizeEstimateError> {
        (self.0)(value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_json_estimator_grows_with_content() {
        let estimator = JsonSizeEstimator::<String>::new();
        let small = estimator.estimate(&"ab".to_string()).unwrap();
        let large = estimator.estimate(&"a".repeat(1000)).unwrap();

        assert!(small > 0);
        assert!(large > small + 900);
    }

    #[test]
    fn test_json_estimator_fails_on_non_string_map_keys() {
        let estimator = JsonSizeEstimator::<HashMap<(u8, u8), u8>>::new();
        let mut value: HashMap<(u8, u8), u8> = HashMap::new();
        value.insert((1, 2), 3);

        assert!(estimator.estimate(&value).is_err());
    }

    #[test]
    fn test_shallow_estimator() {
        let estimator = ShallowSizeEstimator;
        assert_eq!(estimator.estimate(&0u64).unwrap(), 8);
    }

    #[test]
    fn test_fn_estimator() {
        let estimator = FnSizeEstimator(|value: &Vec<u8>| {
            if value.is_empty() {
                Err(SizeEstimateError("empty".to_string()))
            } else {
                Ok(value.len())
            }
        });

        assert_eq!(estimator.estimate(&vec![1u8, 2, 3]).unwrap(), 3);
        assert!(estimator.estimate(&Vec::<u8>::new()).is_err());
    }
}
