//! Loading of the corpus-trained model files.
//!
//! A model directory holds four plain-text files:
//!
//! - `dict.txt`: one dictionary word per line.
//! - `initial_model.txt`: `word logProbability`.
//! - `transition_model.txt`: `word1 word2 logProbability`.
//! - `char_edit_model.txt`: `INS char logProbability`, `DEL char logProbability`
//!   or `SUB charObserved charTrue logProbability`.
//!
//! The `<UNK>` sentinel supplies each table's fallback entry.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::CorrectorConfig;
use crate::error::{PalimpsestError, Result};
use crate::model::tables::{CharEditTable, EditKind, ProbabilityTable, TransitionTable};
use crate::spelling::dictionary::Dictionary;

/// Reserved token standing for every key missing from a table.
pub const UNKNOWN_TOKEN: &str = "<UNK>";

pub const DICTIONARY_FILE: &str = "dict.txt";
pub const INITIAL_MODEL_FILE: &str = "initial_model.txt";
pub const TRANSITION_MODEL_FILE: &str = "transition_model.txt";
pub const CHAR_EDIT_MODEL_FILE: &str = "char_edit_model.txt";

/// Fallback used when a word table carries no `<UNK>` entry: `ln(1e-10)`.
pub const DEFAULT_UNKNOWN_LOG_PROB: f64 = -23.025850929940457;

/// The immutable, corpus-trained half of the correction model.
#[derive(Debug, Clone)]
pub struct StaticModel {
    dictionary: Dictionary,
    initial: ProbabilityTable,
    transition: TransitionTable,
    char_edits: CharEditTable,
}

/// Table sizes of a loaded model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub dictionary_words: usize,
    pub initial_entries: usize,
    pub transition_entries: usize,
    pub insertion_entries: usize,
    pub deletion_entries: usize,
    pub substitution_entries: usize,
}

impl StaticModel {
    /// Assemble a model from already-built tables.
    pub fn new(
        dictionary: Dictionary,
        initial: ProbabilityTable,
        transition: TransitionTable,
        char_edits: CharEditTable,
    ) -> Self {
        StaticModel {
            dictionary,
            initial,
            transition,
            char_edits,
        }
    }

    /// Load the four model files from `dir` with default fallbacks.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::load_with_config(dir, &CorrectorConfig::default())
    }

    /// Load the four model files from `dir`.
    ///
    /// Fails with `FileMissing` if any file is absent and with `Format` if a
    /// line does not have the expected columns.
    pub fn load_with_config<P: AsRef<Path>>(dir: P, config: &CorrectorConfig) -> Result<Self> {
        let dir = dir.as_ref();
        info!("Loading static model from {}", dir.display());

        let paths = [
            DICTIONARY_FILE,
            INITIAL_MODEL_FILE,
            TRANSITION_MODEL_FILE,
            CHAR_EDIT_MODEL_FILE,
        ]
        .map(|name| dir.join(name));
        if let Some(missing) = paths.iter().find(|path| !path.exists()) {
            return Err(PalimpsestError::file_missing(missing));
        }
        let [dict_path, initial_path, transition_path, char_edit_path] = paths;

        let dictionary = Dictionary::load_from_file(&dict_path)?;
        let initial = load_initial(&initial_path)?;
        let mut transition = load_transition(&transition_path)?;
        if let Some(fallback) = config.unknown_transition_log_prob {
            transition.set_fallback(fallback);
        }
        let char_edits = load_char_edits(&char_edit_path, config.char_edit_fallback_log_prob)?;

        let model = StaticModel::new(dictionary, initial, transition, char_edits);
        let summary = model.summary();
        info!(
            "Loaded {} dictionary words, {} initial and {} transition entries",
            summary.dictionary_words, summary.initial_entries, summary.transition_entries
        );
        Ok(model)
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn char_edits(&self) -> &CharEditTable {
        &self.char_edits
    }

    /// Static `log P(word starts a sentence)`.
    pub fn initial_log_prob(&self, word: &str) -> f64 {
        self.initial.log_prob(word)
    }

    /// Static `log P(next | prev)`.
    pub fn transition_log_prob(&self, prev: &str, next: &str) -> f64 {
        self.transition.log_prob(prev, next)
    }

    pub fn summary(&self) -> ModelSummary {
        let (insertion_entries, deletion_entries, substitution_entries) = self.char_edits.sizes();
        ModelSummary {
            dictionary_words: self.dictionary.word_count(),
            initial_entries: self.initial.len(),
            transition_entries: self.transition.len(),
            insertion_entries,
            deletion_entries,
            substitution_entries,
        }
    }
}

/// Non-blank lines of `path` split on whitespace, with 1-based line numbers.
fn read_rows(path: &Path) -> Result<Vec<(usize, Vec<String>)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let columns: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if !columns.is_empty() {
            rows.push((index + 1, columns));
        }
    }
    Ok(rows)
}

fn parse_log_prob(path: &Path, line: usize, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(PalimpsestError::format(
            path,
            line,
            format!("`{value}` is not a log-probability"),
        )),
    }
}

fn parse_char(path: &Path, line: usize, value: &str) -> Result<Option<char>> {
    if value == UNKNOWN_TOKEN {
        return Ok(None);
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(Some(ch)),
        _ => Err(PalimpsestError::format(
            path,
            line,
            format!("`{value}` is not a single character or {UNKNOWN_TOKEN}"),
        )),
    }
}

fn load_initial(path: &Path) -> Result<ProbabilityTable> {
    let mut table = ProbabilityTable::new(DEFAULT_UNKNOWN_LOG_PROB);
    let mut has_unknown = false;
    for (line, columns) in read_rows(path)? {
        if columns.len() != 2 {
            return Err(PalimpsestError::format(
                path,
                line,
                "expected `word logProbability`",
            ));
        }
        let log_prob = parse_log_prob(path, line, &columns[1])?;
        if columns[0] == UNKNOWN_TOKEN {
            table.set_fallback(log_prob);
            has_unknown = true;
        } else {
            table.insert(columns[0].to_lowercase(), log_prob);
        }
    }
    if !has_unknown {
        warn!(
            "{} has no {UNKNOWN_TOKEN} entry, using {DEFAULT_UNKNOWN_LOG_PROB}",
            path.display()
        );
    }
    Ok(table)
}

fn load_transition(path: &Path) -> Result<TransitionTable> {
    let mut table = TransitionTable::new(DEFAULT_UNKNOWN_LOG_PROB);
    let mut has_unknown = false;
    for (line, columns) in read_rows(path)? {
        if columns.len() != 3 {
            return Err(PalimpsestError::format(
                path,
                line,
                "expected `word1 word2 logProbability`",
            ));
        }
        let log_prob = parse_log_prob(path, line, &columns[2])?;
        if columns[0] == UNKNOWN_TOKEN && columns[1] == UNKNOWN_TOKEN {
            table.set_fallback(log_prob);
            has_unknown = true;
        } else {
            table.insert(columns[0].to_lowercase(), columns[1].to_lowercase(), log_prob);
        }
    }
    if !has_unknown {
        warn!(
            "{} has no {UNKNOWN_TOKEN} {UNKNOWN_TOKEN} entry, using {DEFAULT_UNKNOWN_LOG_PROB}",
            path.display()
        );
    }
    Ok(table)
}

fn load_char_edits(path: &Path, fallback: f64) -> Result<CharEditTable> {
    let mut table = CharEditTable::new(fallback);
    for (line, columns) in read_rows(path)? {
        let expected = match columns[0].as_str() {
            "INS" | "DEL" => 3,
            "SUB" => 4,
            other => {
                return Err(PalimpsestError::format(
                    path,
                    line,
                    format!("unknown edit `{other}`, expected INS, DEL or SUB"),
                ));
            }
        };
        if columns.len() != expected {
            return Err(PalimpsestError::format(
                path,
                line,
                "expected `INS char logProbability`, `DEL char logProbability` \
                 or `SUB charObserved charTrue logProbability`",
            ));
        }
        let log_prob = parse_log_prob(path, line, &columns[expected - 1])?;
        match columns[0].as_str() {
            "INS" => match parse_char(path, line, &columns[1])? {
                Some(ch) => table.insert_insertion(ch, log_prob),
                None => table.set_fallback(EditKind::Insertion, log_prob),
            },
            "DEL" => match parse_char(path, line, &columns[1])? {
                Some(ch) => table.insert_deletion(ch, log_prob),
                None => table.set_fallback(EditKind::Deletion, log_prob),
            },
            _ => match (
                parse_char(path, line, &columns[1])?,
                parse_char(path, line, &columns[2])?,
            ) {
                (Some(observed), Some(truth)) => {
                    table.insert_substitution(observed, truth, log_prob)
                }
                (None, None) => table.set_fallback(EditKind::Substitution, log_prob),
                _ => {
                    return Err(PalimpsestError::format(
                        path,
                        line,
                        format!("SUB fallback must name {UNKNOWN_TOKEN} twice"),
                    ));
                }
            },
        }
    }
    Ok(table)
}
