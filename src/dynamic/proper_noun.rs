//! Document-level proper noun canonicalization.
//!
//! OCR output often spells the same name several ways across a document.
//! Frequent spellings are taken as canonical and rarer spellings within a
//! small edit distance are mapped onto them.

use ahash::{AHashMap, AHashSet};

use crate::dynamic::counts::CountTable;
use crate::util::levenshtein::levenshtein_distance_threshold;

/// Apostrophe-like marks that introduce a contraction or possessive.
const CONTRACTION_MARKS: [char; 2] = ['\'', '’'];

/// Whether `token` looks like a proper noun: at least `min_length`
/// characters, starting with an uppercase alphabetic character.
pub fn is_proper_noun(token: &str, min_length: usize) -> bool {
    token.chars().count() >= min_length
        && token
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() && c.is_uppercase())
}

/// Split `word` at its first contraction mark: `("darcy", "’s")`.
fn split_contraction(word: &str) -> Option<(&str, &str)> {
    word.find(CONTRACTION_MARKS).map(|idx| word.split_at(idx))
}

/// Maps garbled spellings of proper nouns to a canonical spelling.
///
/// Implementations work on lowercase words.
pub trait ProperNounCanonicalizer: Send + Sync {
    /// The canonical spelling of `word`, or `word` itself if it has none.
    fn canonicalize(&self, word: &str) -> String;

    /// Whether `word` is itself a canonical proper noun.
    fn is_canonical(&self, word: &str) -> bool;
}

/// Pairwise canonicalization: every frequent spelling claims all rarer
/// spellings within the distance bound that no more frequent spelling has
/// claimed. Quadratic in the number of distinct proper nouns.
#[derive(Debug, Clone, Default)]
pub struct PairwiseCanonicalizer {
    canonical: AHashSet<String>,
    map: AHashMap<String, String>,
}

impl PairwiseCanonicalizer {
    /// Build from proper noun counts.
    ///
    /// Spellings are visited from most to least frequent (ties in
    /// lexicographic order). A spelling seen at least `min_frequency` times
    /// and not yet claimed becomes canonical. It then claims each later,
    /// unclaimed spelling within `max_distance` edits, provided both or
    /// neither carry a contraction mark. When only the rarer spelling has
    /// one, its root before the mark is compared and mapped instead.
    pub fn build(counts: &CountTable<String>, min_frequency: u64, max_distance: usize) -> Self {
        let mut nouns: Vec<(&String, u64)> = counts.iter().collect();
        nouns.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut canonicalizer = PairwiseCanonicalizer::default();
        for (i, &(noun, frequency)) in nouns.iter().enumerate() {
            if frequency < min_frequency || canonicalizer.map.contains_key(noun.as_str()) {
                continue;
            }
            canonicalizer.canonical.insert(noun.clone());
            let noun_marked = split_contraction(noun).is_some();

            for &(other, _) in &nouns[i + 1..] {
                if canonicalizer.map.contains_key(other.as_str()) {
                    continue;
                }
                match (noun_marked, split_contraction(other)) {
                    (false, Some((root, _))) => {
                        if root != noun.as_str()
                            && !canonicalizer.map.contains_key(root)
                            && levenshtein_distance_threshold(noun, root, max_distance).is_some()
                        {
                            canonicalizer.map.insert(root.to_string(), noun.clone());
                        }
                    }
                    (true, None) => {}
                    _ => {
                        if levenshtein_distance_threshold(noun, other, max_distance).is_some() {
                            canonicalizer.map.insert(other.clone(), noun.clone());
                        }
                    }
                }
            }
        }
        canonicalizer
    }

    /// Variant-to-canonical mapping.
    pub fn mappings(&self) -> &AHashMap<String, String> {
        &self.map
    }

    pub fn canonical_nouns(&self) -> &AHashSet<String> {
        &self.canonical
    }
}

impl ProperNounCanonicalizer for PairwiseCanonicalizer {
    fn canonicalize(&self, word: &str) -> String {
        if let Some(canonical) = self.map.get(word) {
            return canonical.clone();
        }
        // "darcey’s" -> "darcy’s" when only the root was mapped.
        if let Some((root, suffix)) = split_contraction(word)
            && let Some(canonical) = self.map.get(root)
        {
            return format!("{canonical}{suffix}");
        }
        word.to_string()
    }

    fn is_canonical(&self, word: &str) -> bool {
        self.canonical.contains(word)
    }
}
