//! Per-document dynamic model.

pub mod counts;
pub mod model;
pub mod proper_noun;

pub use counts::CountTable;
pub use model::DynamicModel;
pub use proper_noun::{PairwiseCanonicalizer, ProperNounCanonicalizer, is_proper_noun};
