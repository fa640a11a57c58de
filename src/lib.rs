//! # Palimpsest
//!
//! Adaptive Viterbi correction of noisy OCR token streams.
//!
//! ## Features
//!
//! - Static, corpus-trained initial, transition and character-edit models
//! - Per-document dynamic model re-estimated sentence by sentence
//! - Proper noun canonicalization across a document
//! - Bounded trie-based candidate search with memoized emission scoring
//! - Parallel correction of independent documents

pub mod cli;
pub mod config;
pub mod corrector;
pub mod decoder;
pub mod document;
pub mod dynamic;
pub mod error;
pub mod model;
pub mod spelling;
pub mod util;

pub mod prelude {
    pub use crate::config::{CorrectorConfig, DynamicFeatures};
    pub use crate::corrector::{
        CanonicalizerFactory, CorrectedDocument, CorrectionStats, DocumentCorrector,
    };
    pub use crate::document::Document;
    pub use crate::error::{PalimpsestError, Result};
    pub use crate::model::StaticModel;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
