//! Eviction Policy Module
//!
//! Picks the single item to drop when the cache is over its entry or
//! memory budget.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cache::CacheItem;

const SECS_PER_HOUR: f64 = 3600.0;

// == Adaptive Weights ==
const ACCESS_WEIGHT: f64 = 0.4;
const AGE_WEIGHT: f64 = 0.3;
const COST_WEIGHT: f64 = 0.3;

// == Eviction Policy ==
/// Victim selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least recently used item goes first
    #[default]
    Lru,
    /// Item with the largest cost goes first
    Cost,
    /// Item with the lowest blended access/age/cost score goes first
    Adaptive,
}

impl EvictionPolicy {
    // == Select Victim ==
    /// Chooses the key to evict.
    ///
    /// `candidates` must be ordered least recently used first; ties in the
    /// Cost and Adaptive policies go to the earlier candidate. `scan_limit`
    /// bounds how many candidates the Adaptive policy scores.
    ///
    /// Returns None when there are no candidates.
    pub fn select_victim<'a, V: 'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a CacheItem<V>>,
        now: Instant,
        scan_limit: Option<usize>,
    ) -> Option<&'a str> {
        let mut candidates = candidates.into_iter();

        let victim = match self {
            EvictionPolicy::Lru => candidates.next(),
            EvictionPolicy::Cost => candidates.fold(None, |best: Option<&'a CacheItem<V>>, item| {
                match best {
                    Some(current) if item.cost <= current.cost => Some(current),
                    _ => Some(item),
                }
            }),
            EvictionPolicy::Adaptive => {
                let limit = scan_limit.unwrap_or(usize::MAX);
                candidates
                    .take(limit)
                    .map(|item| (adaptive_score(item, now), item))
                    .fold(None, |best: Option<(f64, &'a CacheItem<V>)>, (score, item)| {
                        match best {
                            Some((lowest, current)) if score >= lowest => Some((lowest, current)),
                            _ => Some((score, item)),
                        }
                    })
                    .map(|(_, item)| item)
            }
        };

        victim.map(|item| item.key.as_str())
    }
}

// == Adaptive Score ==
/// Scores an item for the Adaptive policy; lower scores are evicted first.
///
/// `0.4 * access_count / (1 + idle_hours) + 0.3 / (1 + age_hours) + 0.3 / (1 + cost)`
pub fn adaptive_score<V>(item: &CacheItem<V>, now: Instant) -> f64 {
    let age_hours = now.saturating_duration_since(item.created_at).as_secs_f64() / SECS_PER_HOUR;
    let idle_hours = now.saturating_duration_since(item.last_access).as_secs_f64() / SECS_PER_HOUR;

    let access_factor = item.access_count as f64 / (1.0 + idle_hours);
    let age_factor = 1.0 / (1.0 + age_hours);
    let cost_factor = 1.0 / (1.0 + item.cost);

    ACCESS_WEIGHT * access_factor + AGE_WEIGHT * age_factor + COST_WEIGHT * cost_factor
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvictionPolicy::Lru => "lru",
            EvictionPolicy::Cost => "cost",
            EvictionPolicy::Adaptive => "adaptive",
        };
        f.write_str(name)
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "cost" => Ok(EvictionPolicy::Cost),
            "adaptive" => Ok(EvictionPolicy::Adaptive),
            other => Err(format!("unknown eviction policy '{}'", other)),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const HOUR: Duration = Duration::from_secs(3600);

    fn item(key: &str, cost: f64, created_at: Instant) -> CacheItem<u32> {
        CacheItem::new(key.to_string(), 0, None, cost, created_at)
    }

    #[test]
    fn test_empty_candidates() {
        let items: Vec<CacheItem<u32>> = Vec::new();
        let now = Instant::now();

        for policy in [EvictionPolicy::Lru, EvictionPolicy::Cost, EvictionPolicy::Adaptive] {
            assert_eq!(policy.select_victim(&items, now, None), None);
        }
    }

    #[test]
    fn test_lru_picks_first_candidate() {
        let now = Instant::now();
        let items = vec![item("old", 1.0, now), item("new", 1.0, now)];

        assert_eq!(EvictionPolicy::Lru.select_victim(&items, now, None), Some("old"));
    }

    #[test]
    fn test_cost_picks_largest_cost() {
        let now = Instant::now();
        let items = vec![
            item("cheap", 0.5, now),
            item("pricey", 9.0, now),
            item("mid", 3.0, now),
        ];

        assert_eq!(EvictionPolicy::Cost.select_victim(&items, now, None), Some("pricey"));
    }

    #[test]
    fn test_cost_ties_go_to_least_recent() {
        let now = Instant::now();
        let items = vec![
            item("a", 1.0, now),
            item("b", 5.0, now),
            item("c", 5.0, now),
        ];

        assert_eq!(EvictionPolicy::Cost.select_victim(&items, now, None), Some("b"));
    }

    #[test]
    fn test_adaptive_score_of_fresh_item() {
        let now = Instant::now();
        let fresh = item("fresh", 1.0, now);

        // access 0, age factor 1, cost factor 1/2
        let expected = 0.3 + 0.3 * 0.5;
        assert!((adaptive_score(&fresh, now) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_adaptive_score_decays_with_age_and_idle_time() {
        let start = Instant::now();
        let mut hot = item("hot", 0.0, start);
        hot.record_access(start);
        hot.record_access(start);

        let now = start + HOUR;
        // access 2/(1+1), age 1/(1+1), cost 1/(1+0)
        let expected = 0.4 * 1.0 + 0.3 * 0.5 + 0.3 * 1.0;
        assert!((adaptive_score(&hot, now) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_adaptive_evicts_old_unused_expensive_item() {
        let start = Instant::now();
        let now = start + 10 * HOUR;

        let stale = item("stale", 50.0, start);
        let mut hot = item("hot", 0.1, now);
        for _ in 0..5 {
            hot.record_access(now);
        }

        // Hot item sits at the LRU end, so only the score decides.
        let items = vec![hot, stale];
        assert_eq!(EvictionPolicy::Adaptive.select_victim(&items, now, None), Some("stale"));
    }

    #[test]
    fn test_adaptive_scan_limit_bounds_candidates() {
        let start = Instant::now();
        let now = start + HOUR;

        let mut warm = item("warm", 0.0, now);
        warm.record_access(now);
        let stale = item("stale", 100.0, start);

        let items = vec![warm, stale];
        assert_eq!(
            EvictionPolicy::Adaptive.select_victim(&items, now, Some(1)),
            Some("warm")
        );
    }

    #[test]
    fn test_policy_parse_and_display() {
        assert_eq!("LRU".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Lru));
        assert_eq!(" cost ".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Cost));
        assert_eq!("adaptive".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Adaptive));
        assert!("lfu".parse::<EvictionPolicy>().is_err());
        assert_eq!(EvictionPolicy::Adaptive.to_string(), "adaptive");
    }

    #[test]
    fn test_policy_serde_lowercase() {
        let json = serde_json::to_string(&EvictionPolicy::Cost).unwrap();
        assert_eq!(json, "\"cost\"");
        let parsed: EvictionPolicy = serde_json::from_str("\"adaptive\"").unwrap();
        assert_eq!(parsed, EvictionPolicy::Adaptive);
    }
}
