//! Emission scoring: how likely a true word was garbled into an observed string.

use crate::dynamic::DynamicModel;
use crate::model::StaticModel;
use crate::spelling::cache::EpochCache;

/// Character edit probabilities in effect for one sentence: the static table
/// plus, when confusion learning is on, the document's dynamic estimate
/// scaled by the sentence weight.
#[derive(Clone, Copy)]
pub struct ConfusionModel<'a> {
    static_model: &'a StaticModel,
    dynamic: Option<&'a DynamicModel>,
    weight: f64,
    epoch: u64,
}

impl<'a> ConfusionModel<'a> {
    /// Static probabilities only.
    pub fn fixed(static_model: &'a StaticModel) -> Self {
        ConfusionModel {
            static_model,
            dynamic: None,
            weight: 0.0,
            epoch: 0,
        }
    }

    /// Static probabilities blended with `dynamic` at `weight`.
    ///
    /// `epoch` must change whenever the blended values may change.
    pub fn blended(
        static_model: &'a StaticModel,
        dynamic: &'a DynamicModel,
        weight: f64,
        epoch: u64,
    ) -> Self {
        ConfusionModel {
            static_model,
            dynamic: Some(dynamic),
            weight,
            epoch,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn insertion(&self, ch: char) -> f64 {
        let learned = self
            .dynamic
            .and_then(|d| d.char_ins_log_prob(ch, self.weight))
            .unwrap_or(0.0);
        self.static_model.char_edits().insertion_log_prob(ch) + learned
    }

    pub fn deletion(&self, ch: char) -> f64 {
        let learned = self
            .dynamic
            .and_then(|d| d.char_del_log_prob(ch, self.weight))
            .unwrap_or(0.0);
        self.static_model.char_edits().deletion_log_prob(ch) + learned
    }

    pub fn substitution(&self, observed: char, truth: char) -> f64 {
        let learned = self
            .dynamic
            .and_then(|d| d.char_sub_log_prob(observed, truth, self.weight))
            .unwrap_or(0.0);
        self.static_model
            .char_edits()
            .substitution_log_prob(observed, truth)
            + learned
    }
}

/// Memoized character-level alignment scorer.
#[derive(Debug, Default)]
pub struct EmissionScorer {
    memo: EpochCache<(String, String), f64>,
}

impl EmissionScorer {
    pub fn new() -> Self {
        EmissionScorer::default()
    }

    /// `log P(observed | candidate)` under `confusion`.
    ///
    /// Results are memoized per `(observed, candidate)` until the epoch of
    /// `confusion` changes.
    pub fn log_prob(&mut self, confusion: &ConfusionModel<'_>, observed: &str, candidate: &str) -> f64 {
        self.memo.sync(confusion.epoch());
        let key = (observed.to_string(), candidate.to_string());
        if let Some(&score) = self.memo.get(&key) {
            return score;
        }
        let score = align_log_prob(confusion, observed, candidate);
        self.memo.insert(key, score);
        score
    }

    /// Number of memoized scores valid in the current epoch.
    pub fn cached(&self) -> usize {
        self.memo.len()
    }
}

/// Best log-probability of reading `candidate` as `observed`.
///
/// `table[i][j]` is the best score for recognizing the first `j` characters
/// of the candidate as the first `i` characters of the observation. Row 0
/// and column 0 are pure deletion and pure insertion runs.
fn align_log_prob(confusion: &ConfusionModel<'_>, observed: &str, candidate: &str) -> f64 {
    let obs: Vec<char> = observed.chars().collect();
    let cand: Vec<char> = candidate.chars().collect();

    let mut table = vec![vec![0.0f64; cand.len() + 1]; obs.len() + 1];
    for i in 1..=obs.len() {
        table[i][0] = table[i - 1][0] + confusion.insertion(obs[i - 1]);
    }
    for j in 1..=cand.len() {
        table[0][j] = table[0][j - 1] + confusion.deletion(cand[j - 1]);
    }

    for i in 1..=obs.len() {
        for j in 1..=cand.len() {
            let insertion = table[i - 1][j] + confusion.insertion(obs[i - 1]);
            let deletion = table[i][j - 1] + confusion.deletion(cand[j - 1]);
            let substitution =
                table[i - 1][j - 1] + confusion.substitution(obs[i - 1], cand[j - 1]);
            table[i][j] = insertion.max(deletion).max(substitution);
        }
    }

    table[obs.len()][cand.len()]
}
