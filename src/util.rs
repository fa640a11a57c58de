//! Shared utilities.

pub mod levenshtein;
