//! Log-probability lookup tables with unknown-key fallbacks.
//!
//! Every lookup succeeds: a key that is absent from a table resolves to that
//! table's fallback entry.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// `word -> log P(word is sentence-initial)`.
#[derive(Debug, Clone)]
pub struct ProbabilityTable {
    entries: AHashMap<String, f64>,
    fallback: f64,
}

impl ProbabilityTable {
    pub fn new(fallback: f64) -> Self {
        ProbabilityTable {
            entries: AHashMap::new(),
            fallback,
        }
    }

    pub fn insert<S: Into<String>>(&mut self, word: S, log_prob: f64) {
        self.entries.insert(word.into(), log_prob);
    }

    /// Exact entry for `word`, if the table has one.
    pub fn get(&self, word: &str) -> Option<f64> {
        self.entries.get(word).copied()
    }

    /// Log-probability of `word`, or the fallback.
    pub fn log_prob(&self, word: &str) -> f64 {
        self.get(word).unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    pub fn set_fallback(&mut self, fallback: f64) {
        self.fallback = fallback;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `(word1, word2) -> log P(word2 | word1)`.
///
/// Stored as a nested map so lookups work on borrowed `&str` pairs.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    entries: AHashMap<String, AHashMap<String, f64>>,
    pairs: usize,
    fallback: f64,
}

impl TransitionTable {
    pub fn new(fallback: f64) -> Self {
        TransitionTable {
            entries: AHashMap::new(),
            pairs: 0,
            fallback,
        }
    }

    pub fn insert<S: Into<String>>(&mut self, prev: S, next: S, log_prob: f64) {
        let followers = self.entries.entry(prev.into()).or_default();
        if followers.insert(next.into(), log_prob).is_none() {
            self.pairs += 1;
        }
    }

    pub fn get(&self, prev: &str, next: &str) -> Option<f64> {
        self.entries.get(prev)?.get(next).copied()
    }

    /// Log-probability that `next` follows `prev`, or the fallback.
    pub fn log_prob(&self, prev: &str, next: &str) -> f64 {
        self.get(prev, next).unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    pub fn set_fallback(&mut self, fallback: f64) {
        self.fallback = fallback;
    }

    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }
}

/// Kind of character-level OCR error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditKind {
    /// The OCR output contains a spurious character.
    Insertion,
    /// A true character is missing from the OCR output.
    Deletion,
    /// A true character was read as another (or the same) character.
    Substitution,
}

/// Character edit log-probabilities.
///
/// Substitutions are keyed `(observed, truth)`: the probability that the
/// true character `truth` is recognized by the OCR engine as `observed`.
#[derive(Debug, Clone)]
pub struct CharEditTable {
    insertions: AHashMap<char, f64>,
    deletions: AHashMap<char, f64>,
    substitutions: AHashMap<(char, char), f64>,
    insertion_fallback: f64,
    deletion_fallback: f64,
    substitution_fallback: f64,
}

impl CharEditTable {
    /// Create an empty table whose every kind falls back to `fallback`.
    pub fn new(fallback: f64) -> Self {
        CharEditTable {
            insertions: AHashMap::new(),
            deletions: AHashMap::new(),
            substitutions: AHashMap::new(),
            insertion_fallback: fallback,
            deletion_fallback: fallback,
            substitution_fallback: fallback,
        }
    }

    pub fn insert_insertion(&mut self, ch: char, log_prob: f64) {
        self.insertions.insert(ch, log_prob);
    }

    pub fn insert_deletion(&mut self, ch: char, log_prob: f64) {
        self.deletions.insert(ch, log_prob);
    }

    pub fn insert_substitution(&mut self, observed: char, truth: char, log_prob: f64) {
        self.substitutions.insert((observed, truth), log_prob);
    }

    pub fn set_fallback(&mut self, kind: EditKind, log_prob: f64) {
        match kind {
            EditKind::Insertion => self.insertion_fallback = log_prob,
            EditKind::Deletion => self.deletion_fallback = log_prob,
            EditKind::Substitution => self.substitution_fallback = log_prob,
        }
    }

    pub fn fallback(&self, kind: EditKind) -> f64 {
        match kind {
            EditKind::Insertion => self.insertion_fallback,
            EditKind::Deletion => self.deletion_fallback,
            EditKind::Substitution => self.substitution_fallback,
        }
    }

    pub fn insertion_log_prob(&self, ch: char) -> f64 {
        self.insertions
            .get(&ch)
            .copied()
            .unwrap_or(self.insertion_fallback)
    }

    pub fn deletion_log_prob(&self, ch: char) -> f64 {
        self.deletions
            .get(&ch)
            .copied()
            .unwrap_or(self.deletion_fallback)
    }

    pub fn substitution_log_prob(&self, observed: char, truth: char) -> f64 {
        self.substitutions
            .get(&(observed, truth))
            .copied()
            .unwrap_or(self.substitution_fallback)
    }

    /// Number of entries of each kind: (insertions, deletions, substitutions).
    pub fn sizes(&self) -> (usize, usize, usize) {
        (
            self.insertions.len(),
            self.deletions.len(),
            self.substitutions.len(),
        )
    }
}
