//! Corrector configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PalimpsestError, Result};

/// Document-specific model features layered on top of the static model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicFeatures {
    /// Canonicalize garbled proper nouns and keep canonical spellings as-is.
    pub proper_nouns: bool,
    /// Learn initial and transition counts from the document.
    pub context: bool,
    /// Learn character confusion counts from the document.
    pub confusion: bool,
}

impl DynamicFeatures {
    /// All document-specific features enabled.
    pub fn all() -> Self {
        DynamicFeatures {
            proper_nouns: true,
            context: true,
            confusion: true,
        }
    }

    /// Whether any feature needs the dynamic model to be fed after each sentence.
    pub fn learns(&self) -> bool {
        self.context || self.confusion
    }

    pub fn any(&self) -> bool {
        self.proper_nouns || self.context || self.confusion
    }
}

/// Configuration for the document corrector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectorConfig {
    /// Maximum edit distance for candidate search.
    pub max_edit_distance: usize,
    /// Maximum number of candidates kept per observed token.
    pub max_candidates: usize,
    /// Document-specific features.
    pub features: DynamicFeatures,
    /// Additive smoothing constant used by the dynamic model.
    pub smoothing: f64,
    /// Minimum occurrences for a proper noun to become a canonical spelling.
    pub proper_noun_min_frequency: u64,
    /// Maximum edit distance between a variant and its canonical spelling.
    pub proper_noun_max_distance: usize,
    /// Minimum character length of a proper noun.
    pub proper_noun_min_length: usize,
    /// Overrides the static `<UNK> <UNK>` transition entry when set.
    pub unknown_transition_log_prob: Option<f64>,
    /// Character edit log-probability used when the model file has no `<UNK>` entry.
    pub char_edit_fallback_log_prob: f64,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        CorrectorConfig {
            max_edit_distance: 3,
            max_candidates: 10,
            features: DynamicFeatures::default(),
            smoothing: 1e-10,
            proper_noun_min_frequency: 10,
            proper_noun_max_distance: 2,
            proper_noun_min_length: 5,
            unknown_transition_log_prob: None,
            char_edit_fallback_log_prob: -10.0,
        }
    }
}

impl CorrectorConfig {
    /// Load a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PalimpsestError::file_missing(path));
        }
        let content = fs::read_to_string(path)?;
        let config: CorrectorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a decoder.
    pub fn validate(&self) -> Result<()> {
        if self.max_candidates == 0 {
            return Err(PalimpsestError::invalid_config(
                "max_candidates must be at least 1",
            ));
        }
        if !(self.smoothing > 0.0 && self.smoothing < 1.0) {
            return Err(PalimpsestError::invalid_config(format!(
                "smoothing must lie in (0, 1), got {}",
                self.smoothing
            )));
        }
        if !self.char_edit_fallback_log_prob.is_finite() {
            return Err(PalimpsestError::invalid_config(
                "char_edit_fallback_log_prob must be finite",
            ));
        }
        if let Some(value) = self.unknown_transition_log_prob
            && !value.is_finite()
        {
            return Err(PalimpsestError::invalid_config(
                "unknown_transition_log_prob must be finite",
            ));
        }
        Ok(())
    }
}
