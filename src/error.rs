//! Error types for the Palimpsest library.
//!
//! All fallible operations return [`PalimpsestError`]. Errors fall into two
//! groups: configuration errors (a model file is missing or malformed, or the
//! corrector configuration is unusable), which abort a run before any
//! decoding starts, and invariant violations, which abort the current
//! document because a dynamic-model count would have gone negative or a
//! sentence arrived empty.
//!
//! Probability-table misses and empty candidate searches are not errors; they
//! are recovered locally with fallback values.
//!
//! # Examples
//!
//! ```
//! use palimpsest::error::{PalimpsestError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PalimpsestError::invalid_config("max_candidates must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for Palimpsest operations.
#[derive(Error, Debug)]
pub enum PalimpsestError {
    /// I/O errors other than a missing model file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required model file does not exist.
    #[error("Model file missing: {}", path.display())]
    FileMissing { path: PathBuf },

    /// A line of a model file could not be parsed.
    #[error("Malformed line {line} in {}: {message}", path.display())]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The corrector configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An internal counting or precondition invariant was broken.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with PalimpsestError.
pub type Result<T> = std::result::Result<T, PalimpsestError>;

impl PalimpsestError {
    /// Create a new missing-file error.
    pub fn file_missing<P: Into<PathBuf>>(path: P) -> Self {
        PalimpsestError::FileMissing { path: path.into() }
    }

    /// Create a new format error for a 1-based line number.
    pub fn format<P: Into<PathBuf>, S: Into<String>>(path: P, line: usize, message: S) -> Self {
        PalimpsestError::Format {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PalimpsestError::InvalidConfig(msg.into())
    }

    /// Create a new invariant violation.
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        PalimpsestError::InvariantViolation(msg.into())
    }

    /// Whether this error belongs to the load-time configuration category.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PalimpsestError::FileMissing { .. }
                | PalimpsestError::Format { .. }
                | PalimpsestError::InvalidConfig(_)
        )
    }

    /// Whether this error reports a broken invariant.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, PalimpsestError::InvariantViolation(_))
    }
}
