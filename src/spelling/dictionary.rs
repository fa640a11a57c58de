//! The static correction vocabulary.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashSet;

use crate::error::{PalimpsestError, Result};
use crate::model::UNKNOWN_TOKEN;

/// A set of known-correct lowercase words.
///
/// Tokens found here are "in vocabulary" and bypass candidate search.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// Set of all words for fast lookup
    word_set: AHashSet<String>,
    /// The same words in sorted order, for deterministic iteration
    sorted: Vec<String>,
}

impl Dictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        Dictionary::default()
    }

    /// Build a dictionary from an iterator of words. Words are lower-cased.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let word_set: AHashSet<String> = words
            .into_iter()
            .filter_map(|word| normalize(word.as_ref()))
            .collect();
        let mut sorted: Vec<String> = word_set.iter().cloned().collect();
        sorted.sort_unstable();
        Dictionary { word_set, sorted }
    }

    /// Add a word. Blank words and the unknown-token sentinel are ignored.
    pub fn add_word(&mut self, word: &str) {
        let Some(normalized) = normalize(word) else {
            return;
        };
        if self.word_set.insert(normalized.clone()) {
            let position = self.sorted.binary_search(&normalized).unwrap_or_else(|p| p);
            self.sorted.insert(position, normalized);
        }
    }

    /// Check if a lowercase word exists in the dictionary.
    pub fn contains(&self, word: &str) -> bool {
        self.word_set.contains(word)
    }

    /// All words in lexicographic order.
    pub fn words(&self) -> &[String] {
        &self.sorted
    }

    /// Get the total number of unique words.
    pub fn word_count(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Load a dictionary from a text file with one word per line.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PalimpsestError::file_missing(path));
        }

        let reader = BufReader::new(File::open(path)?);
        let mut words = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let word = line.trim();
            if word.is_empty() {
                continue;
            }
            if word.split_whitespace().count() != 1 {
                return Err(PalimpsestError::format(
                    path,
                    index + 1,
                    "expected one dictionary word per line",
                ));
            }
            words.push(word.to_string());
        }
        Ok(Dictionary::from_words(words))
    }
}

/// Lowercase `word`, rejecting blanks and the unknown-token sentinel.
fn normalize(word: &str) -> Option<String> {
    let normalized = word.trim().to_lowercase();
    if normalized.is_empty() || normalized == UNKNOWN_TOKEN.to_lowercase() {
        None
    } else {
        Some(normalized)
    }
}
