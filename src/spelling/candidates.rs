//! Candidate generation for observed tokens.

use std::cmp::Ordering;

use crate::dynamic::ProperNounCanonicalizer;
use crate::spelling::cache::EpochCache;
use crate::spelling::dictionary::Dictionary;
use crate::spelling::emission::{ConfusionModel, EmissionScorer};
use crate::spelling::matcher::ApproximateMatcher;

/// Configuration for candidate generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateConfig {
    /// Maximum edit distance passed to the approximate matcher.
    pub max_distance: usize,
    /// Maximum number of candidates returned.
    pub max_candidates: usize,
    /// Keep known proper nouns as-is and offer the observed token as a candidate.
    pub document_dictionary: bool,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        CandidateConfig {
            max_distance: 3,
            max_candidates: 10,
            document_dictionary: false,
        }
    }
}

/// Everything a candidate search consults besides the token itself.
pub struct CandidateSources<'a> {
    pub dictionary: &'a Dictionary,
    pub matcher: &'a dyn ApproximateMatcher,
    pub proper_nouns: Option<&'a dyn ProperNounCanonicalizer>,
    pub confusion: ConfusionModel<'a>,
}

/// Produces a ranked, size-bounded list of corrections for a token.
#[derive(Debug)]
pub struct CandidateGenerator {
    config: CandidateConfig,
    memo: EpochCache<String, Vec<String>>,
}

impl CandidateGenerator {
    pub fn new(config: CandidateConfig) -> Self {
        CandidateGenerator {
            config,
            memo: EpochCache::new(),
        }
    }

    pub fn config(&self) -> &CandidateConfig {
        &self.config
    }

    /// Candidates for the lowercase token `observed`, best first. Never empty.
    ///
    /// Known proper nouns (in document-dictionary mode) and dictionary words
    /// are their own single candidate. Otherwise dictionary words within the
    /// edit bound are ranked by emission log-probability, ties broken
    /// lexicographically; with no match the token stands for itself.
    pub fn candidates_for(
        &mut self,
        observed: &str,
        sources: &CandidateSources<'_>,
        scorer: &mut EmissionScorer,
    ) -> Vec<String> {
        if self.config.document_dictionary
            && sources
                .proper_nouns
                .is_some_and(|nouns| nouns.is_canonical(observed))
        {
            return vec![observed.to_string()];
        }
        if sources.dictionary.contains(observed) {
            return vec![observed.to_string()];
        }

        self.memo.sync(sources.confusion.epoch());
        if let Some(cached) = self.memo.get(observed) {
            return cached.clone();
        }

        let matches: Vec<&str> = sources
            .matcher
            .find_matches(observed, self.config.max_distance)
            .collect();

        let candidates = if matches.is_empty() {
            vec![observed.to_string()]
        } else {
            let mut scored: Vec<(String, f64)> = matches
                .into_iter()
                .map(|word| {
                    let score = scorer.log_prob(&sources.confusion, observed, word);
                    (word.to_string(), score)
                })
                .collect();
            if self.config.document_dictionary {
                let score = scorer.log_prob(&sources.confusion, observed, observed);
                scored.push((observed.to_string(), score));
            }
            scored.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            scored.dedup_by(|a, b| a.0 == b.0);
            scored.truncate(self.config.max_candidates);
            scored.into_iter().map(|(word, _)| word).collect()
        };

        self.memo.insert(observed.to_string(), candidates.clone());
        candidates
    }
}
