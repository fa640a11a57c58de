//! Command line argument parsing for the Palimpsest CLI using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::CorrectorConfig;
use crate::error::Result;

/// Palimpsest - adaptive Viterbi correction of OCR token streams
#[derive(Parser, Debug, Clone)]
#[command(name = "palimpsest")]
#[command(about = "Correct OCR token streams with static and document-adaptive models")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PalimpsestArgs {
    /// Verbosity level (repeat for more: -v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PalimpsestArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Correct one token file
    Correct(CorrectArgs),

    /// Correct several token files in parallel
    Batch(BatchArgs),

    /// Show the sizes of a static model's tables
    Inspect(InspectArgs),
}

/// Model selection and correction switches shared by `correct` and `batch`.
#[derive(Args, Debug, Clone)]
pub struct CorrectionOptions {
    /// Maximum edit distance of candidate corrections
    #[arg(short = 'k', long = "max-edit-distance")]
    pub max_edit_distance: Option<usize>,

    /// Maximum number of candidates per token
    #[arg(long)]
    pub max_candidates: Option<usize>,

    /// Enable document-specific proper noun correction
    #[arg(long)]
    pub enable_dict: bool,

    /// Enable document-specific word and bigram statistics
    #[arg(long)]
    pub enable_context: bool,

    /// Enable document-specific character confusion learning
    #[arg(long)]
    pub enable_conf: bool,

    /// Corrector configuration file (JSON); flags override its values
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

impl CorrectionOptions {
    /// The configuration file (or defaults) with explicit flags applied.
    pub fn corrector_config(&self) -> Result<CorrectorConfig> {
        let mut config = match &self.config {
            Some(path) => CorrectorConfig::from_json_file(path)?,
            None => CorrectorConfig::default(),
        };
        if let Some(k) = self.max_edit_distance {
            config.max_edit_distance = k;
        }
        if let Some(max) = self.max_candidates {
            config.max_candidates = max;
        }
        config.features.proper_nouns |= self.enable_dict;
        config.features.context |= self.enable_context;
        config.features.confusion |= self.enable_conf;
        config.validate()?;
        Ok(config)
    }
}

/// Arguments for correcting a single document
#[derive(Parser, Debug, Clone)]
pub struct CorrectArgs {
    /// Directory holding dict.txt and the three model files
    #[arg(value_name = "MODELS_DIR")]
    pub models_dir: PathBuf,

    /// Token file, one token per line
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the corrected text
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: CorrectionOptions,
}

/// Arguments for correcting several documents
#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    /// Directory holding dict.txt and the three model files
    #[arg(value_name = "MODELS_DIR")]
    pub models_dir: PathBuf,

    /// Token files, one token per line
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving `<stem>.corrected.txt` files
    #[arg(long, value_name = "DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub options: CorrectionOptions,
}

/// Arguments for inspecting a model directory
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Directory holding dict.txt and the three model files
    #[arg(value_name = "MODELS_DIR")]
    pub models_dir: PathBuf,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
