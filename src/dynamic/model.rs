//! Per-document dynamic model.

use log::{debug, info};

use crate::config::{CorrectorConfig, DynamicFeatures};
use crate::dynamic::counts::CountTable;
use crate::dynamic::proper_noun::{PairwiseCanonicalizer, ProperNounCanonicalizer, is_proper_noun};
use crate::error::{PalimpsestError, Result};
use crate::spelling::alignment::{EditOp, edit_ops};

/// Statistics about one document, re-estimated as its sentences are corrected.
///
/// Construction counts the whole document as if every token were already
/// correct. Each [`DynamicModel::update`] then moves counts from the observed
/// spellings to the corrected ones. Every log-probability accessor returns
/// `None` when its feature is disabled and is otherwise scaled by the
/// caller's sentence weight.
pub struct DynamicModel {
    features: DynamicFeatures,
    smoothing: f64,

    sentence_count: u64,
    total_t_count: u64,
    initial_count: CountTable<String>,
    dict_count: CountTable<String>,
    pair_count: CountTable<(String, String)>,

    total_c_count: u64,
    c_count: CountTable<char>,
    ins_count: CountTable<char>,
    del_count: CountTable<char>,
    sub_count: CountTable<(char, char)>,

    proper_noun_count: CountTable<String>,
    canonicalizer: Option<Box<dyn ProperNounCanonicalizer>>,
}

impl DynamicModel {
    /// Run the counting pass over `sentences` (raw, case-preserved tokens)
    /// and, with proper noun correction enabled, build the canonical map.
    pub fn new(sentences: &[Vec<String>], config: &CorrectorConfig) -> Self {
        let features = config.features;
        let mut model = DynamicModel {
            features,
            smoothing: config.smoothing,
            sentence_count: sentences.len() as u64,
            total_t_count: 0,
            initial_count: CountTable::new("initial"),
            dict_count: CountTable::new("word"),
            pair_count: CountTable::new("word pair"),
            total_c_count: 0,
            c_count: CountTable::new("character"),
            ins_count: CountTable::new("insertion"),
            del_count: CountTable::new("deletion"),
            sub_count: CountTable::new("substitution"),
            proper_noun_count: CountTable::new("proper noun"),
            canonicalizer: None,
        };

        if features.any() {
            for sentence in sentences {
                model.count_sentence(sentence, config.proper_noun_min_length);
            }
        }

        if features.proper_nouns {
            let canonicalizer = PairwiseCanonicalizer::build(
                &model.proper_noun_count,
                config.proper_noun_min_frequency,
                config.proper_noun_max_distance,
            );
            debug!(
                "{} canonical proper nouns, {} variant spellings",
                canonicalizer.canonical_nouns().len(),
                canonicalizer.mappings().len()
            );
            model.canonicalizer = Some(Box::new(canonicalizer));
        }

        info!(
            "Dynamic model: {} sentences, {} distinct words, {} characters, {} proper nouns",
            model.sentence_count,
            model.dict_count.len(),
            model.total_c_count,
            model.proper_noun_count.len()
        );
        model
    }

    fn count_sentence(&mut self, sentence: &[String], proper_noun_min_length: usize) {
        if self.features.context {
            self.total_t_count += sentence.len().saturating_sub(1) as u64;
        }
        for (position, token) in sentence.iter().enumerate() {
            let lower = token.to_lowercase();
            if self.features.proper_nouns
                && position > 0
                && is_proper_noun(token, proper_noun_min_length)
            {
                self.proper_noun_count.increment(lower.clone());
            }
            if self.features.confusion {
                for ch in lower.chars() {
                    self.total_c_count += 1;
                    self.c_count.increment(ch);
                }
            }
            if self.features.context {
                self.dict_count.increment(lower);
            }
        }
    }

    /// Replace the proper noun strategy. Has no effect unless proper noun
    /// correction is enabled.
    pub fn set_canonicalizer(&mut self, canonicalizer: Box<dyn ProperNounCanonicalizer>) {
        if self.features.proper_nouns {
            self.canonicalizer = Some(canonicalizer);
        }
    }

    pub fn features(&self) -> DynamicFeatures {
        self.features
    }

    pub fn proper_nouns(&self) -> Option<&dyn ProperNounCanonicalizer> {
        self.canonicalizer.as_deref()
    }

    /// Lowercase proper noun occurrences counted in the first pass.
    pub fn proper_noun_counts(&self) -> &CountTable<String> {
        &self.proper_noun_count
    }

    pub fn dict_count(&self, word: &str) -> u64 {
        self.dict_count.get(word)
    }

    pub fn pair_count(&self, prev: &str, next: &str) -> u64 {
        self.pair_count.get(&(prev.to_string(), next.to_string()))
    }

    pub fn sentence_count(&self) -> u64 {
        self.sentence_count
    }

    pub fn total_transition_count(&self) -> u64 {
        self.total_t_count
    }

    pub fn total_char_count(&self) -> u64 {
        self.total_c_count
    }

    pub fn initial_log_prob(&self, word: &str, weight: f64) -> Option<f64> {
        if !self.features.context {
            return None;
        }
        let sm = self.smoothing;
        let denominator =
            (self.sentence_count as f64 + (self.initial_count.len() + 1) as f64 * sm).max(1.0);
        let numerator = match self.initial_count.get(word) {
            0 => sm,
            count => count as f64 + sm,
        };
        Some(weight * (numerator / denominator).ln())
    }

    pub fn transition_log_prob(&self, prev: &str, next: &str, weight: f64) -> Option<f64> {
        if !self.features.context {
            return None;
        }
        let sm = self.smoothing;
        let pair = self.pair_count(prev, next);
        let prev_count = self.dict_count.get(prev);
        let log_prob = if pair > 0 && self.dict_count.contains(prev) {
            let denominator = (prev_count as f64 + self.dict_count.len() as f64 * sm).max(1.0);
            ((pair as f64 + sm) / denominator).ln()
        } else {
            (sm / self.total_t_count.max(1) as f64).ln()
        };
        Some(weight * log_prob)
    }

    pub fn char_ins_log_prob(&self, ch: char, weight: f64) -> Option<f64> {
        if !self.features.confusion {
            return None;
        }
        let total = self.total_c_count.max(1) as f64;
        let log_prob = match self.ins_count.get(&ch) {
            0 => ((1.0 - self.smoothing) / total).ln(),
            count => (count as f64 / total).ln(),
        };
        Some(weight * log_prob)
    }

    pub fn char_del_log_prob(&self, ch: char, weight: f64) -> Option<f64> {
        if !self.features.confusion {
            return None;
        }
        let deletions = self.del_count.get(&ch);
        let occurrences = self.c_count.get(&ch);
        let log_prob = if deletions > 0 && occurrences > 0 {
            (deletions as f64 / occurrences as f64).ln()
        } else {
            ((1.0 - self.smoothing) / self.total_c_count.max(1) as f64).ln()
        };
        Some(weight * log_prob)
    }

    pub fn char_sub_log_prob(&self, observed: char, truth: char, weight: f64) -> Option<f64> {
        if !self.features.confusion {
            return None;
        }
        let substitutions = self.sub_count.get(&(observed, truth));
        let occurrences = self.c_count.get(&truth);
        let log_prob = if substitutions > 0 && occurrences > 0 {
            (substitutions as f64 / occurrences as f64).ln()
        } else if observed == truth {
            self.smoothing.ln()
        } else {
            ((1.0 - self.smoothing) / self.total_c_count.max(1) as f64).ln()
        };
        Some(weight * log_prob)
    }

    /// Move counts from the `observed` spellings of a finalized sentence to
    /// its `corrected` words.
    ///
    /// `observed` holds the raw tokens; `corrected` the decoder's lowercase
    /// output. Fails with an invariant violation if the lengths differ or a
    /// count would drop below zero.
    pub fn update(&mut self, observed: &[String], corrected: &[String]) -> Result<()> {
        if observed.len() != corrected.len() {
            return Err(PalimpsestError::invariant(format!(
                "update with {} observed but {} corrected tokens",
                observed.len(),
                corrected.len()
            )));
        }

        if self.features.context
            && let Some(first) = corrected.first()
        {
            self.initial_count.increment(first.clone());
        }

        for (position, (raw, word)) in observed.iter().zip(corrected).enumerate() {
            let token = raw.to_lowercase();
            if self.features.context {
                self.update_context(position, &token, word, corrected)?;
            }
            if self.features.confusion && !raw.chars().any(char::is_uppercase) {
                self.update_confusion(&token, word)?;
            }
        }

        debug!(
            "Dynamic model updated: {} distinct words, {} characters",
            self.dict_count.len(),
            self.total_c_count
        );
        Ok(())
    }

    fn update_context(
        &mut self,
        position: usize,
        token: &str,
        word: &str,
        corrected: &[String],
    ) -> Result<()> {
        if token != word {
            self.dict_count.decrement(token, true)?;
            self.dict_count.increment(word.to_string());
        }
        if position > 0 {
            self.pair_count
                .increment((corrected[position - 1].clone(), word.to_string()));
        }
        Ok(())
    }

    fn update_confusion(&mut self, token: &str, word: &str) -> Result<()> {
        let adjusted = self.total_c_count as i64 + word.chars().count() as i64
            - token.chars().count() as i64;
        if adjusted < 0 {
            return Err(PalimpsestError::invariant(format!(
                "character total would go negative correcting {token:?} to {word:?}"
            )));
        }
        self.total_c_count = adjusted as u64;

        for op in edit_ops(token, word) {
            match op {
                EditOp::Substituted { observed, truth } => {
                    self.sub_count.increment((observed, truth));
                    self.c_count.decrement(&observed, false)?;
                    self.c_count.increment(truth);
                }
                EditOp::Inserted(ch) => {
                    self.ins_count.increment(ch);
                    self.c_count.decrement(&ch, false)?;
                }
                EditOp::Deleted(ch) => {
                    self.del_count.increment(ch);
                    self.c_count.increment(ch);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn config(features: DynamicFeatures) -> CorrectorConfig {
        CorrectorConfig {
            features,
            ..Default::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_disabled_features_contribute_nothing() {
        let doc = vec![sentence(&["the", "cat"])];
        let model = DynamicModel::new(&doc, &config(DynamicFeatures::default()));

        assert_eq!(model.initial_log_prob("the", 0.5), None);
        assert_eq!(model.transition_log_prob("the", "cat", 0.5), None);
        assert_eq!(model.char_ins_log_prob('a', 0.5), None);
        assert_eq!(model.char_del_log_prob('a', 0.5), None);
        assert_eq!(model.char_sub_log_prob('a', 'e', 0.5), None);
        assert!(model.proper_nouns().is_none());
        assert_eq!(model.dict_count("the"), 0);
    }

    #[test]
    fn test_first_pass_counts() {
        let doc = vec![sentence(&["The", "cat", "sat"]), sentence(&["the", "dog"])];
        let model = DynamicModel::new(&doc, &config(DynamicFeatures::all()));

        assert_eq!(model.sentence_count(), 2);
        assert_eq!(model.total_transition_count(), 3);
        assert_eq!(model.dict_count("the"), 2);
        assert_eq!(model.dict_count("cat"), 1);
        assert_eq!(model.total_char_count(), 15);
    }

    #[test]
    fn test_zero_weight_is_exactly_zero() {
        let doc = vec![sentence(&["tha", "cot"])];
        let model = DynamicModel::new(&doc, &config(DynamicFeatures::all()));

        assert_eq!(model.initial_log_prob("the", 0.0), Some(0.0));
        assert_eq!(model.transition_log_prob("the", "cat", 0.0), Some(0.0));
        assert_eq!(model.char_ins_log_prob('a', 0.0), Some(0.0));
        assert_eq!(model.char_del_log_prob('a', 0.0), Some(0.0));
        assert_eq!(model.char_sub_log_prob('a', 'e', 0.0), Some(0.0));
    }

    #[test]
    fn test_update_learns_confusions() {
        let doc = vec![sentence(&["tha", "cot"]), sentence(&["tha", "dog"])];
        let mut model = DynamicModel::new(&doc, &config(DynamicFeatures::all()));
        let before = model.char_sub_log_prob('a', 'e', 1.0).unwrap();

        model
            .update(&doc[0], &sentence(&["the", "cat"]))
            .unwrap();

        // a->e once; 'e' now occurs once.
        let after = model.char_sub_log_prob('a', 'e', 1.0).unwrap();
        assert!(close(after, 0.0));
        assert!(after > before);

        assert_eq!(model.dict_count("tha"), 1);
        assert_eq!(model.dict_count("the"), 1);
        assert_eq!(model.dict_count("cot"), 0);
        assert_eq!(model.pair_count("the", "cat"), 1);
    }

    #[test]
    fn test_learned_transition_and_initial() {
        let doc = vec![sentence(&["the", "cat"]), sentence(&["the", "cat"])];
        let mut model = DynamicModel::new(&doc, &config(DynamicFeatures::all()));
        let unseen = model.transition_log_prob("the", "cat", 1.0).unwrap();
        assert!(close(unseen, (1e-10f64 / 2.0).ln()));

        model.update(&doc[0], &doc[0]).unwrap();
        let seen = model.transition_log_prob("the", "cat", 1.0).unwrap();
        assert!(seen > unseen);
        assert!(model.initial_log_prob("the", 1.0).unwrap() > model.initial_log_prob("cat", 1.0).unwrap());
    }

    #[test]
    fn test_uppercase_tokens_do_not_teach_confusions() {
        let doc = vec![sentence(&["Tha"])];
        let mut model = DynamicModel::new(&doc, &config(DynamicFeatures::all()));
        let total = model.total_char_count();

        model.update(&doc[0], &sentence(&["then"])).unwrap();
        assert_eq!(model.total_char_count(), total);
        assert_eq!(model.dict_count("then"), 1);
        assert_eq!(model.dict_count("tha"), 0);
    }

    #[test]
    fn test_negative_count_is_invariant_violation() {
        let doc = vec![sentence(&["tha"])];
        let mut model = DynamicModel::new(&doc, &config(DynamicFeatures::all()));

        model.update(&doc[0], &sentence(&["the"])).unwrap();
        // "tha" was counted once and has already been revised.
        let err = model.update(&doc[0], &sentence(&["the"])).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_length_mismatch_is_invariant_violation() {
        let doc = vec![sentence(&["tha", "cat"])];
        let mut model = DynamicModel::new(&doc, &config(DynamicFeatures::all()));
        let err = model.update(&doc[0], &sentence(&["the"])).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_proper_noun_canonicalization() {
        let mut doc = Vec::new();
        for _ in 0..15 {
            doc.push(sentence(&["Mr", "Darcy", "smiled"]));
        }
        for _ in 0..2 {
            doc.push(sentence(&["Mr", "Darcey", "frowned"]));
        }
        doc.push(sentence(&["Darcey", "left"]));

        let features = DynamicFeatures {
            proper_nouns: true,
            ..Default::default()
        };
        let model = DynamicModel::new(&doc, &config(features));

        // Sentence-initial occurrences are not counted.
        assert_eq!(model.proper_noun_counts().get("darcey"), 2);
        let nouns = model.proper_nouns().unwrap();
        assert_eq!(nouns.canonicalize("darcey"), "darcy");
        assert!(nouns.is_canonical("darcy"));
    }
}
