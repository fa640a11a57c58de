//! Static Model Store: the corpus-trained dictionary and probability tables.
//!
//! Loaded once per run and read-only afterwards, so a single instance can be
//! shared (behind an `Arc`) by every document being corrected.

pub mod static_model;
pub mod tables;

pub use static_model::*;
pub use tables::*;
