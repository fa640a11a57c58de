//! The adaptive Viterbi decoder.

use std::sync::Arc;

use log::debug;

use crate::config::CorrectorConfig;
use crate::decoder::trellis::Trellis;
use crate::dynamic::{DynamicModel, is_proper_noun};
use crate::error::{PalimpsestError, Result};
use crate::model::StaticModel;
use crate::spelling::candidates::{CandidateConfig, CandidateGenerator, CandidateSources};
use crate::spelling::emission::{ConfusionModel, EmissionScorer};
use crate::spelling::matcher::ApproximateMatcher;

impl From<&CorrectorConfig> for CandidateConfig {
    fn from(config: &CorrectorConfig) -> Self {
        CandidateConfig {
            max_distance: config.max_edit_distance,
            max_candidates: config.max_candidates,
            document_dictionary: config.features.proper_nouns,
        }
    }
}

/// Corrects the sentences of one document, in order.
///
/// Owns the document's [`DynamicModel`] together with the candidate and
/// emission memos. Both memos are keyed by an epoch that advances whenever
/// the learned confusion probabilities change.
pub struct ViterbiDecoder {
    model: Arc<StaticModel>,
    matcher: Arc<dyn ApproximateMatcher>,
    dynamic: DynamicModel,
    config: CorrectorConfig,
    candidates: CandidateGenerator,
    scorer: EmissionScorer,
    epoch: u64,
}

impl ViterbiDecoder {
    pub fn new(
        model: Arc<StaticModel>,
        matcher: Arc<dyn ApproximateMatcher>,
        dynamic: DynamicModel,
        config: &CorrectorConfig,
    ) -> Self {
        ViterbiDecoder {
            model,
            matcher,
            dynamic,
            config: config.clone(),
            candidates: CandidateGenerator::new(CandidateConfig::from(config)),
            scorer: EmissionScorer::new(),
            epoch: 0,
        }
    }

    pub fn dynamic_model(&self) -> &DynamicModel {
        &self.dynamic
    }

    pub fn into_dynamic_model(self) -> DynamicModel {
        self.dynamic
    }

    /// Current cache epoch; advances after every sentence when confusion
    /// learning is enabled.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Decode one sentence of raw tokens at dynamic-model `weight` and feed
    /// the result back into the dynamic model.
    ///
    /// The output is lowercase and has exactly one word per input token.
    pub fn correct_sentence(&mut self, raw: &[String], weight: f64) -> Result<Vec<String>> {
        if raw.is_empty() {
            return Err(PalimpsestError::invariant("cannot decode an empty sentence"));
        }

        let tokens = self.preprocess(raw);
        let corrected = self.decode(&tokens, weight)?;
        debug!("Decoded {:?} as {:?}", raw, corrected);

        if self.config.features.learns() {
            self.dynamic.update(raw, &corrected)?;
        }
        if self.config.features.confusion {
            self.epoch += 1;
        }
        Ok(corrected)
    }

    /// Rewrite garbled proper nouns to their canonical spelling, then lowercase.
    fn preprocess(&self, raw: &[String]) -> Vec<String> {
        let nouns = if self.config.features.proper_nouns {
            self.dynamic.proper_nouns()
        } else {
            None
        };

        raw.iter()
            .enumerate()
            .map(|(position, token)| {
                let lower = token.to_lowercase();
                match nouns {
                    Some(nouns)
                        if position > 0
                            && !self.model.dictionary().contains(&lower)
                            && is_proper_noun(token, self.config.proper_noun_min_length) =>
                    {
                        nouns.canonicalize(&lower)
                    }
                    _ => lower,
                }
            })
            .collect()
    }

    fn decode(&mut self, tokens: &[String], weight: f64) -> Result<Vec<String>> {
        let model = self.model.as_ref();
        let dynamic = &self.dynamic;
        let sources = CandidateSources {
            dictionary: model.dictionary(),
            matcher: self.matcher.as_ref(),
            proper_nouns: dynamic.proper_nouns(),
            confusion: ConfusionModel::blended(model, dynamic, weight, self.epoch),
        };

        let mut trellis = Trellis::new();
        for (position, token) in tokens.iter().enumerate() {
            let candidates = self
                .candidates
                .candidates_for(token, &sources, &mut self.scorer);
            let emissions: Vec<f64> = candidates
                .iter()
                .map(|candidate| self.scorer.log_prob(&sources.confusion, token, candidate))
                .collect();

            if position == 0 {
                let scores = candidates
                    .iter()
                    .zip(emissions)
                    .map(|(candidate, emission)| {
                        model.initial_log_prob(candidate)
                            + dynamic.initial_log_prob(candidate, weight).unwrap_or(0.0)
                            + emission
                    })
                    .collect();
                trellis.initialize(candidates, scores)?;
            } else {
                trellis.induct(candidates, emissions, |prev, next| {
                    model.transition_log_prob(prev, next)
                        + dynamic
                            .transition_log_prob(prev, next, weight)
                            .unwrap_or(0.0)
                })?;
            }
        }

        trellis.best_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DynamicFeatures;
    use crate::decoder::dynamic_weight;
    use crate::model::{CharEditTable, EditKind, ProbabilityTable, TransitionTable};
    use crate::spelling::dictionary::Dictionary;
    use crate::spelling::matcher::TrieMatcher;

    fn static_model(words: &[&str]) -> Arc<StaticModel> {
        static_model_with(words, TransitionTable::new(-5.0))
    }

    fn static_model_with(words: &[&str], transitions: TransitionTable) -> Arc<StaticModel> {
        let mut edits = CharEditTable::new(-10.0);
        for ch in 'a'..='z' {
            edits.insert_substitution(ch, ch, -0.05);
        }
        edits.set_fallback(EditKind::Substitution, -4.0);
        edits.set_fallback(EditKind::Insertion, -6.0);
        edits.set_fallback(EditKind::Deletion, -6.0);
        Arc::new(StaticModel::new(
            Dictionary::from_words(words),
            ProbabilityTable::new(-5.0),
            transitions,
            edits,
        ))
    }

    fn decoder(
        model: Arc<StaticModel>,
        doc: &[Vec<String>],
        config: &CorrectorConfig,
    ) -> ViterbiDecoder {
        let matcher: Arc<dyn ApproximateMatcher> =
            Arc::new(TrieMatcher::new(model.dictionary()));
        let dynamic = DynamicModel::new(doc, config);
        ViterbiDecoder::new(model, matcher, dynamic, config)
    }

    fn sentence(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_corrects_substitution_errors() {
        let model = static_model(&["the", "cat", "sat"]);
        let doc = vec![sentence(&["Tha", "cot", "saat"])];
        let config = CorrectorConfig::default();
        let mut decoder = decoder(model, &doc, &config);

        let corrected = decoder.correct_sentence(&doc[0], 0.0).unwrap();
        assert_eq!(corrected, vec!["the", "cat", "sat"]);
    }

    #[test]
    fn test_dictionary_words_are_kept() {
        // "cat" is far more likely than "cot" after "the".
        let mut transitions = TransitionTable::new(-5.0);
        transitions.insert("the", "cat", -0.01);
        let model = static_model_with(&["the", "cat", "cot", "sat"], transitions);
        let doc = vec![sentence(&["the", "cot", "sat"])];
        let mut decoder = decoder(model, &doc, &CorrectorConfig::default());

        let corrected = decoder.correct_sentence(&doc[0], 0.0).unwrap();
        assert_eq!(corrected, vec!["the", "cot", "sat"]);
    }

    #[test]
    fn test_empty_sentence_rejected() {
        let model = static_model(&["the"]);
        let mut decoder = decoder(model, &[], &CorrectorConfig::default());
        let err = decoder.correct_sentence(&[], 0.0).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_length_preserved_for_unknown_tokens() {
        let model = static_model(&["the", "cat"]);
        let doc = vec![sentence(&["qqqqqqq", "zzz", "xyzzy", "the"])];
        let mut decoder = decoder(model, &doc, &CorrectorConfig::default());

        let corrected = decoder.correct_sentence(&doc[0], 0.0).unwrap();
        assert_eq!(corrected.len(), doc[0].len());
        assert_eq!(corrected[0], "qqqqqqq");
        assert_eq!(corrected[3], "the");
    }

    #[test]
    fn test_confusion_learning_advances_epoch() {
        let model = static_model(&["the", "cat", "sat"]);
        let doc = vec![
            sentence(&["tha", "cat", "sat"]),
            sentence(&["the", "cot", "sat"]),
        ];
        let config = CorrectorConfig {
            features: DynamicFeatures::all(),
            ..Default::default()
        };
        let mut decoder = decoder(model, &doc, &config);

        for (index, raw) in doc.iter().enumerate() {
            decoder
                .correct_sentence(raw, dynamic_weight(index, doc.len()))
                .unwrap();
        }
        assert_eq!(decoder.epoch(), 2);
    }

    #[test]
    fn test_word_counts_match_corrected_output() {
        let model = static_model(&["the", "cat", "sat", "on", "mat"]);
        let doc = vec![
            sentence(&["Tha", "cot", "saat"]),
            sentence(&["the", "cat", "sat", "on", "tha", "mat"]),
            sentence(&["tha", "mot"]),
        ];
        let config = CorrectorConfig {
            features: DynamicFeatures::all(),
            ..Default::default()
        };
        let mut decoder = decoder(model, &doc, &config);

        let mut output = Vec::new();
        for (index, raw) in doc.iter().enumerate() {
            output.extend(
                decoder
                    .correct_sentence(raw, dynamic_weight(index, doc.len()))
                    .unwrap(),
            );
        }

        let dynamic = decoder.into_dynamic_model();
        for word in ["the", "tha", "cat", "cot", "sat", "saat", "on", "mat", "mot"] {
            let tally = output.iter().filter(|w| w.as_str() == word).count() as u64;
            assert_eq!(dynamic.dict_count(word), tally, "count of {word}");
        }
    }

    #[test]
    fn test_garbled_proper_noun_canonicalized() {
        let model = static_model(&["mr", "smiled", "left"]);
        let mut doc = Vec::new();
        for _ in 0..12 {
            doc.push(sentence(&["Mr", "Darcy", "smiled"]));
        }
        doc.push(sentence(&["Mr", "Darcey", "left"]));
        let config = CorrectorConfig {
            features: DynamicFeatures {
                proper_nouns: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut decoder = decoder(model, &doc, &config);

        let last = doc.len() - 1;
        let corrected = decoder
            .correct_sentence(&doc[last], dynamic_weight(last, doc.len()))
            .unwrap();
        assert_eq!(corrected, vec!["mr", "darcy", "left"]);
    }
}
