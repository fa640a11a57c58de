//! Whole-document correction.

use std::sync::Arc;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CorrectorConfig;
use crate::decoder::{ViterbiDecoder, dynamic_weight};
use crate::document::Document;
use crate::dynamic::{CountTable, DynamicModel, ProperNounCanonicalizer};
use crate::error::Result;
use crate::model::StaticModel;
use crate::spelling::matcher::{ApproximateMatcher, TrieMatcher};

/// Counts describing one corrected document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionStats {
    pub sentences: usize,
    pub tokens: usize,
    /// Tokens whose correction differs from their lowercased input.
    pub tokens_changed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectedDocument {
    pub sentences: Vec<Vec<String>>,
    pub stats: CorrectionStats,
}

/// Builds a document's proper noun strategy from its first-pass
/// proper noun counts.
pub type CanonicalizerFactory =
    Arc<dyn Fn(&CountTable<String>) -> Box<dyn ProperNounCanonicalizer> + Send + Sync>;

/// Corrects documents against one shared static model.
///
/// Each document is decoded sequentially with its own dynamic model;
/// independent documents may be corrected in parallel.
pub struct DocumentCorrector {
    model: Arc<StaticModel>,
    matcher: Arc<dyn ApproximateMatcher>,
    canonicalizer: Option<CanonicalizerFactory>,
    config: CorrectorConfig,
}

impl DocumentCorrector {
    /// Build a corrector with a [`TrieMatcher`] over the static dictionary.
    pub fn new(model: Arc<StaticModel>, config: CorrectorConfig) -> Result<Self> {
        config.validate()?;
        let matcher = Arc::new(TrieMatcher::new(model.dictionary()));
        Ok(DocumentCorrector {
            model,
            matcher,
            canonicalizer: None,
            config,
        })
    }

    /// Use `matcher` for candidate search instead of the default trie.
    pub fn with_matcher(mut self, matcher: Arc<dyn ApproximateMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Build each document's proper noun strategy with `factory` instead of
    /// the default pairwise canonicalizer. Only used with proper noun
    /// correction enabled.
    pub fn with_canonicalizer(mut self, factory: CanonicalizerFactory) -> Self {
        self.canonicalizer = Some(factory);
        self
    }

    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    pub fn model(&self) -> &StaticModel {
        &self.model
    }

    /// Correct the sentences of one document in order.
    pub fn correct_document(&self, sentences: &[Vec<String>]) -> Result<CorrectedDocument> {
        let mut dynamic = DynamicModel::new(sentences, &self.config);
        if let Some(factory) = &self.canonicalizer {
            let canonicalizer = factory(dynamic.proper_noun_counts());
            dynamic.set_canonicalizer(canonicalizer);
        }
        let mut decoder = ViterbiDecoder::new(
            Arc::clone(&self.model),
            Arc::clone(&self.matcher),
            dynamic,
            &self.config,
        );

        let total = sentences.len();
        let mut corrected = Vec::with_capacity(total);
        let mut stats = CorrectionStats {
            sentences: total,
            ..Default::default()
        };
        for (index, raw) in sentences.iter().enumerate() {
            let sentence = decoder.correct_sentence(raw, dynamic_weight(index, total))?;
            stats.tokens += sentence.len();
            stats.tokens_changed += raw
                .iter()
                .zip(&sentence)
                .filter(|(token, word)| token.to_lowercase() != **word)
                .count();
            if (index + 1) % 100 == 0 {
                debug!("Corrected {}/{} sentences", index + 1, total);
            }
            corrected.push(sentence);
        }

        info!(
            "Corrected {} sentences, {} of {} tokens changed",
            stats.sentences, stats.tokens_changed, stats.tokens
        );
        Ok(CorrectedDocument {
            sentences: corrected,
            stats,
        })
    }

    /// Correct independent documents in parallel. Results keep input order.
    pub fn correct_documents(&self, documents: &[Document]) -> Vec<Result<CorrectedDocument>> {
        documents
            .par_iter()
            .map(|document| {
                debug!("Correcting {}", document.name);
                self.correct_document(&document.sentences)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use crate::config::DynamicFeatures;
    use crate::model::{CharEditTable, EditKind, ProbabilityTable, TransitionTable};
    use crate::spelling::dictionary::Dictionary;

    /// Offers the same words for every token.
    struct FixedMatcher(Vec<String>);

    impl ApproximateMatcher for FixedMatcher {
        fn find_matches<'a>(
            &'a self,
            _observed: &str,
            _max_distance: usize,
        ) -> Box<dyn Iterator<Item = &'a str> + 'a> {
            Box::new(self.0.iter().map(String::as_str))
        }
    }

    /// Maps one variant spelling onto one canonical name.
    struct SingleName {
        variant: &'static str,
        canonical: &'static str,
    }

    impl ProperNounCanonicalizer for SingleName {
        fn canonicalize(&self, word: &str) -> String {
            if word == self.variant {
                self.canonical.to_string()
            } else {
                word.to_string()
            }
        }

        fn is_canonical(&self, word: &str) -> bool {
            word == self.canonical
        }
    }

    fn model() -> Arc<StaticModel> {
        let mut edits = CharEditTable::new(-10.0);
        for ch in 'a'..='z' {
            edits.insert_substitution(ch, ch, -0.05);
        }
        edits.set_fallback(EditKind::Substitution, -4.0);
        edits.set_fallback(EditKind::Insertion, -6.0);
        edits.set_fallback(EditKind::Deletion, -6.0);
        Arc::new(StaticModel::new(
            Dictionary::from_words(["the", "cat", "sat", "on", "mat"]),
            ProbabilityTable::new(-5.0),
            TransitionTable::new(-5.0),
            edits,
        ))
    }

    fn sentence(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_correct_document_stats() {
        let corrector = DocumentCorrector::new(model(), CorrectorConfig::default()).unwrap();
        let doc = vec![sentence(&["Tha", "cot", "saat"]), sentence(&["on", "the", "mat"])];

        let result = corrector.correct_document(&doc).unwrap();
        assert_eq!(result.sentences[0], vec!["the", "cat", "sat"]);
        assert_eq!(result.sentences[1], vec!["on", "the", "mat"]);
        assert_eq!(
            result.stats,
            CorrectionStats {
                sentences: 2,
                tokens: 6,
                tokens_changed: 3,
            }
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CorrectorConfig {
            max_candidates: 0,
            ..Default::default()
        };
        let err = DocumentCorrector::new(model(), config).err().unwrap();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_parallel_documents_keep_order() {
        let config = CorrectorConfig {
            features: DynamicFeatures::all(),
            ..Default::default()
        };
        let corrector = DocumentCorrector::new(model(), config).unwrap();
        let documents: Vec<Document> = (0..8)
            .map(|i| Document {
                name: format!("doc{i}"),
                sentences: vec![sentence(&["the", "cat"]), sentence(&["on"])],
            })
            .chain(std::iter::once(Document {
                name: "garbled".to_string(),
                sentences: vec![sentence(&["Tha", "cot", "saat"])],
            }))
            .collect();

        let results = corrector.correct_documents(&documents);
        assert_eq!(results.len(), 9);
        for result in &results[..8] {
            let result = result.as_ref().unwrap();
            assert_eq!(result.stats.tokens, 3);
            assert_eq!(result.stats.tokens_changed, 0);
        }
        assert_eq!(results[8].as_ref().unwrap().stats.tokens, 3);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let corrector = DocumentCorrector::new(model(), CorrectorConfig::default()).unwrap();
        let document = Document::from_tokens(
            "page",
            sentence(&["Tha", "cot", "saat", ".", "on", "tha", "mot"]),
        );

        let sequential = corrector.correct_document(&document.sentences).unwrap();
        let parallel = corrector.correct_documents(std::slice::from_ref(&document));
        assert_eq!(parallel[0].as_ref().unwrap(), &sequential);
    }

    #[test]
    fn test_custom_matcher_supplies_candidates() {
        let matcher: Arc<dyn ApproximateMatcher> = Arc::new(FixedMatcher(vec!["mat".to_string()]));
        let corrector = DocumentCorrector::new(model(), CorrectorConfig::default())
            .unwrap()
            .with_matcher(matcher);

        let result = corrector
            .correct_document(&[sentence(&["cot", "sat"])])
            .unwrap();
        assert_eq!(result.sentences[0], vec!["mat", "sat"]);
    }

    #[test]
    fn test_custom_canonicalizer_rewrites_names() {
        let seen = Arc::new(AtomicU64::new(0));
        let recorded = Arc::clone(&seen);
        let factory: CanonicalizerFactory = Arc::new(move |counts: &CountTable<String>| {
            recorded.store(counts.get("bngly"), Ordering::SeqCst);
            Box::new(SingleName {
                variant: "bngly",
                canonical: "bingley",
            }) as Box<dyn ProperNounCanonicalizer>
        });
        let config = CorrectorConfig {
            features: DynamicFeatures {
                proper_nouns: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let corrector = DocumentCorrector::new(model(), config)
            .unwrap()
            .with_canonicalizer(factory);

        let result = corrector
            .correct_document(&[sentence(&["the", "Bngly", "sat"])])
            .unwrap();
        assert_eq!(result.sentences[0], vec!["the", "bingley", "sat"]);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
