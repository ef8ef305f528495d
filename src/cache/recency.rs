//! Recency Index Module
//!
//! Keeps cache keys ordered by last use so eviction can walk them from the
//! least recently used end.

use std::collections::{BTreeMap, HashMap};

// == Recency Index ==
/// Orders keys by access time.
///
/// Every touch hands the key a new, strictly increasing sequence number:
/// - Lowest sequence = least recently used
/// - Highest sequence = most recently used
#[derive(Debug, Default)]
pub struct RecencyIndex {
    /// Sequence number -> key, iterated oldest first
    order: BTreeMap<u64, String>,
    /// Key -> its current sequence number
    positions: HashMap<String, u64>,
    /// Next sequence number to hand out
    next_seq: u64,
}

impl RecencyIndex {
    // == Constructor ==
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, inserting it if unknown.
    pub fn touch(&mut self, key: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;

        match self.positions.get_mut(key) {
            Some(pos) => {
                if let Some(owned) = self.order.remove(&*pos) {
                    self.order.insert(seq, owned);
                }
                *pos = seq;
            }
            None => {
                self.positions.insert(key.to_string(), seq);
                self.order.insert(seq, key.to_string());
            }
        }
    }

    // == Remove ==
    /// Forgets a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(seq) = self.positions.remove(key) {
            self.order.remove(&seq);
        }
    }

    // == Iterate ==
    /// Iterates keys from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.values().map(String::as_str)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
        self.positions.clear();
        self.next_seq = 0;
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order(index: &RecencyIndex) -> Vec<&str> {
        index.iter().collect()
    }

    #[test]
    fn test_index_new() {
        let index = RecencyIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.iter().next(), None);
    }

    #[test]
    fn test_touch_new_keys_keeps_insertion_order() {
        let mut index = RecencyIndex::new();

        index.touch("key1");
        index.touch("key2");
        index.touch("key3");

        assert_eq!(index.len(), 3);
        assert_eq!(index.iter().next(), Some("key1"));
        assert_eq!(order(&index), vec!["key1", "key2", "key3"]);
    }

    #[test]
    fn test_touch_existing_key_moves_to_tail() {
        let mut index = RecencyIndex::new();

        index.touch("key1");
        index.touch("key2");
        index.touch("key3");
        index.touch("key1");

        assert_eq!(index.len(), 3);
        assert_eq!(index.iter().next(), Some("key2"));
        assert_eq!(order(&index), vec!["key2", "key3", "key1"]);
    }

    #[test]
    fn test_remove() {
        let mut index = RecencyIndex::new();

        index.touch("key1");
        index.touch("key2");
        index.touch("key3");
        index.remove("key2");

        assert_eq!(index.len(), 2);
        assert!(!index.contains("key2"));
        assert_eq!(order(&index), vec!["key1", "key3"]);
    }

    #[test]
    fn test_remove_nonexistent_key() {
        let mut index = RecencyIndex::new();

        index.touch("key1");
        index.remove("nonexistent");

        assert_eq!(index.len(), 1);
        assert!(index.contains("key1"));
    }

    #[test]
    fn test_touch_same_key_multiple_times() {
        let mut index = RecencyIndex::new();

        index.touch("key1");
        index.touch("key1");
        index.touch("key1");

        assert_eq!(index.len(), 1);
        assert_eq!(order(&index), vec!["key1"]);
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut index = RecencyIndex::new();

        index.touch("a");
        index.touch("b");
        index.touch("c");
        index.touch("a");
        index.touch("c");
        index.touch("b");

        assert_eq!(order(&index), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_clear() {
        let mut index = RecencyIndex::new();

        index.touch("a");
        index.touch("b");
        index.clear();

        assert!(index.is_empty());
        assert_eq!(index.iter().next(), None);
    }
}
