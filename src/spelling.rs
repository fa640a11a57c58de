//! Candidate search and emission scoring.
//!
//! The dictionary, the approximate matcher that walks it, the character
//! alignment primitive used to learn confusions, and the memoized emission
//! scorer that ranks candidates.

pub mod alignment;
pub mod cache;
pub mod candidates;
pub mod dictionary;
pub mod emission;
pub mod matcher;

pub use alignment::{EditOp, edit_ops};
pub use cache::EpochCache;
pub use candidates::{CandidateConfig, CandidateGenerator, CandidateSources};
pub use dictionary::Dictionary;
pub use emission::{ConfusionModel, EmissionScorer};
pub use matcher::{ApproximateMatcher, TrieMatcher};
