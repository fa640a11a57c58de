//! Approximate dictionary matching.
//!
//! [`TrieMatcher`] walks a character trie of the dictionary depth-first,
//! carrying one Levenshtein row per visited node. A subtree is pruned as soon
//! as the smallest entry of its row exceeds the distance bound, since no
//! extension of that prefix can come back under it.

use crate::spelling::dictionary::Dictionary;
use crate::util::levenshtein::{initial_row, next_row};

/// Finds dictionary words within a bounded edit distance of a token.
///
/// Implementations must be deterministic for a fixed dictionary and return
/// an empty sequence, never an error, when nothing is within the bound.
pub trait ApproximateMatcher: Send + Sync {
    /// Lazily yield every dictionary word within `max_distance` edits of `observed`.
    fn find_matches<'a>(
        &'a self,
        observed: &str,
        max_distance: usize,
    ) -> Box<dyn Iterator<Item = &'a str> + 'a>;
}

#[derive(Debug, Default, Clone)]
struct TrieNode {
    /// Sorted by character so traversal order is lexicographic.
    children: Vec<(char, usize)>,
    word: Option<String>,
}

/// Levenshtein search over a character trie of the dictionary.
#[derive(Debug, Clone)]
pub struct TrieMatcher {
    nodes: Vec<TrieNode>,
    words: usize,
}

impl TrieMatcher {
    /// Build a matcher over every word of `dictionary`.
    pub fn new(dictionary: &Dictionary) -> Self {
        Self::from_words(dictionary.words())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = TrieMatcher {
            nodes: vec![TrieNode::default()],
            words: 0,
        };
        for word in words {
            matcher.insert(word.as_ref());
        }
        matcher
    }

    fn insert(&mut self, word: &str) {
        let mut current = 0;
        for ch in word.chars() {
            current = match self.nodes[current]
                .children
                .binary_search_by(|(c, _)| c.cmp(&ch))
            {
                Ok(pos) => self.nodes[current].children[pos].1,
                Err(pos) => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[current].children.insert(pos, (ch, child));
                    child
                }
            };
        }
        if self.nodes[current].word.is_none() {
            self.nodes[current].word = Some(word.to_string());
            self.words += 1;
        }
    }

    /// Number of distinct words in the trie.
    pub fn word_count(&self) -> usize {
        self.words
    }
}

impl ApproximateMatcher for TrieMatcher {
    fn find_matches<'a>(
        &'a self,
        observed: &str,
        max_distance: usize,
    ) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        let query: Vec<char> = observed.chars().collect();
        let root_row = initial_row(query.len());
        Box::new(TrieMatches {
            nodes: &self.nodes,
            query,
            max_distance,
            stack: vec![(0, root_row)],
        })
    }
}

/// Depth-first iterator over matching words, in lexicographic order.
struct TrieMatches<'a> {
    nodes: &'a [TrieNode],
    query: Vec<char>,
    max_distance: usize,
    stack: Vec<(usize, Vec<usize>)>,
}

impl<'a> Iterator for TrieMatches<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        while let Some((index, row)) = self.stack.pop() {
            let node = &nodes[index];

            // Reverse push so the smallest child is popped first.
            for &(ch, child) in node.children.iter().rev() {
                let child_row = next_row(&row, &self.query, ch);
                if child_row.iter().min().is_some_and(|&m| m <= self.max_distance) {
                    self.stack.push((child, child_row));
                }
            }

            if let Some(word) = &node.word
                && row[self.query.len()] <= self.max_distance
            {
                return Some(word.as_str());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::levenshtein::levenshtein_distance;

    fn matcher() -> TrieMatcher {
        TrieMatcher::from_words(["the", "then", "cat", "cot", "sat", "saturday", "a"])
    }

    #[test]
    fn test_exact_and_near_matches() {
        let matcher = matcher();
        let matches: Vec<&str> = matcher.find_matches("cat", 0).collect();
        assert_eq!(matches, vec!["cat"]);

        let matches: Vec<&str> = matcher.find_matches("cat", 1).collect();
        assert_eq!(matches, vec!["cat", "cot", "sat"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let matcher = matcher();
        assert_eq!(matcher.find_matches("xylophone", 2).count(), 0);
    }

    #[test]
    fn test_results_are_lexicographic() {
        let matcher = matcher();
        let matches: Vec<&str> = matcher.find_matches("tha", 3).collect();
        let mut sorted = matches.clone();
        sorted.sort();
        assert_eq!(matches, sorted);
        assert!(matches.contains(&"the"));
        assert!(matches.contains(&"a"));
    }

    #[test]
    fn test_agrees_with_brute_force() {
        let words = ["the", "then", "cat", "cot", "sat", "saturday", "a", "hat", "that"];
        let matcher = TrieMatcher::from_words(words);
        for query in ["saat", "tht", "caat", "x", ""] {
            for k in 0..=3 {
                let mut expected: Vec<&str> = words
                    .iter()
                    .copied()
                    .filter(|w| levenshtein_distance(query, w) <= k)
                    .collect();
                expected.sort();
                let found: Vec<&str> = matcher.find_matches(query, k).collect();
                assert_eq!(found, expected, "query {query:?} k {k}");
            }
        }
    }

    #[test]
    fn test_duplicate_words_counted_once() {
        let matcher = TrieMatcher::from_words(["cat", "cat", "cats"]);
        assert_eq!(matcher.word_count(), 2);
    }
}
