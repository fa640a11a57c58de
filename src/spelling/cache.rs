//! Memoization scoped to a model epoch.

use std::borrow::Borrow;
use std::hash::Hash;

use ahash::AHashMap;

/// A memo table whose entries are valid for one epoch only.
///
/// Moving to a new epoch with [`EpochCache::sync`] drops every entry.
#[derive(Debug, Clone)]
pub struct EpochCache<K, V> {
    epoch: u64,
    entries: AHashMap<K, V>,
}

impl<K: Eq + Hash, V> EpochCache<K, V> {
    pub fn new() -> Self {
        EpochCache {
            epoch: 0,
            entries: AHashMap::new(),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Move to `epoch`, dropping entries from earlier epochs.
    pub fn sync(&mut self, epoch: u64) {
        if epoch != self.epoch {
            self.epoch = epoch;
            self.entries.clear();
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> Default for EpochCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_expire_with_epoch() {
        let mut cache: EpochCache<String, f64> = EpochCache::new();
        cache.insert("tha".to_string(), -4.1);
        assert_eq!(cache.get("tha"), Some(&-4.1));
        assert_eq!(cache.len(), 1);

        cache.sync(0);
        assert_eq!(cache.get("tha"), Some(&-4.1));

        cache.sync(1);
        assert_eq!(cache.epoch(), 1);
        assert_eq!(cache.get("tha"), None);
        assert!(cache.is_empty());
    }
}
