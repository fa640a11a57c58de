//! Sentence-level Viterbi decoding.

pub mod trellis;
pub mod viterbi;

pub use trellis::Trellis;
pub use viterbi::ViterbiDecoder;

/// Weight of the dynamic model for sentence `index` of a `total`-sentence
/// document: 0 at the first sentence, growing linearly towards 1.
pub fn dynamic_weight(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    index as f64 / total as f64
}
