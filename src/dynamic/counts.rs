//! Non-negative occurrence counts.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

use ahash::AHashMap;

use crate::error::{PalimpsestError, Result};

/// A map of counts that refuses to go below zero.
///
/// Decrementing a missing or zero count is an invariant violation: the
/// dynamic model only ever undoes occurrences it counted earlier.
#[derive(Debug, Clone)]
pub struct CountTable<K> {
    name: &'static str,
    counts: AHashMap<K, u64>,
}

impl<K: Eq + Hash + Debug> CountTable<K> {
    /// Create an empty table. `name` appears in invariant-violation messages.
    pub fn new(name: &'static str) -> Self {
        CountTable {
            name,
            counts: AHashMap::new(),
        }
    }

    pub fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Decrement the count of `key`, optionally removing it once it reaches zero.
    pub fn decrement<Q>(&mut self, key: &Q, remove_at_zero: bool) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let Some(count) = self.counts.get_mut(key) else {
            return Err(PalimpsestError::invariant(format!(
                "{} count for {key:?} decremented but never counted",
                self.name
            )));
        };
        if *count == 0 {
            return Err(PalimpsestError::invariant(format!(
                "{} count for {key:?} would go negative",
                self.name
            )));
        }
        *count -= 1;
        if *count == 0 && remove_at_zero {
            self.counts.remove(key);
        }
        Ok(())
    }

    pub fn get<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, &v)| (k, v))
    }
}
