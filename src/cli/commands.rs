//! Command implementations for the Palimpsest CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::corrector::DocumentCorrector;
use crate::document::{Document, write_sentences};
use crate::error::Result;
use crate::model::StaticModel;

/// Execute a CLI command.
pub fn execute_command(args: PalimpsestArgs) -> Result<()> {
    match &args.command {
        Command::Correct(correct_args) => correct_document(correct_args, &args),
        Command::Batch(batch_args) => correct_batch(batch_args, &args),
        Command::Inspect(inspect_args) => inspect_model(inspect_args, &args),
    }
}

fn build_corrector(models_dir: &Path, options: &CorrectionOptions) -> Result<DocumentCorrector> {
    let config = options.corrector_config()?;
    let model = StaticModel::load_with_config(models_dir, &config)?;
    DocumentCorrector::new(Arc::new(model), config)
}

/// Correct a single token file.
fn correct_document(args: &CorrectArgs, cli_args: &PalimpsestArgs) -> Result<()> {
    let start = Instant::now();
    let corrector = build_corrector(&args.models_dir, &args.options)?;

    let document = Document::load(&args.input)?;
    let corrected = corrector.correct_document(&document.sentences)?;
    write_sentences(&args.output, &corrected.sentences)?;

    output_result(
        "Document corrected",
        &CorrectionReport {
            input: args.input.to_string_lossy().to_string(),
            output: args.output.to_string_lossy().to_string(),
            stats: corrected.stats,
            duration_ms: Some(start.elapsed().as_millis() as u64),
        },
        cli_args,
    )
}

/// Path of the corrected output for `input` inside `output_dir`.
pub fn corrected_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{stem}.corrected.txt"))
}

/// Correct several token files in parallel.
///
/// A document that fails to load or correct is reported and skipped; the
/// others are still written.
fn correct_batch(args: &BatchArgs, cli_args: &PalimpsestArgs) -> Result<()> {
    let start = Instant::now();
    let corrector = build_corrector(&args.models_dir, &args.options)?;
    fs::create_dir_all(&args.output_dir)?;

    let mut failures = Vec::new();
    let mut loaded = Vec::new();
    for input in &args.inputs {
        match Document::load(input) {
            Ok(document) => loaded.push((input, document)),
            Err(e) => {
                warn!("Skipping {}: {e}", input.display());
                failures.push(BatchFailure {
                    input: input.to_string_lossy().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    let (inputs, documents): (Vec<&PathBuf>, Vec<Document>) = loaded.into_iter().unzip();
    info!("Correcting {} documents", documents.len());
    let results = corrector.correct_documents(&documents);

    let mut reports = Vec::new();
    for (input, result) in inputs.into_iter().zip(results) {
        let output = corrected_path(&args.output_dir, input);
        let written = result.and_then(|corrected| {
            write_sentences(&output, &corrected.sentences)?;
            Ok(corrected.stats)
        });
        match written {
            Ok(stats) => reports.push(CorrectionReport {
                input: input.to_string_lossy().to_string(),
                output: output.to_string_lossy().to_string(),
                stats,
                duration_ms: None,
            }),
            Err(e) => {
                warn!("Failed to correct {}: {e}", input.display());
                failures.push(BatchFailure {
                    input: input.to_string_lossy().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    output_result(
        "Batch correction finished",
        &BatchReport {
            documents: reports,
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Show static model table sizes.
fn inspect_model(args: &InspectArgs, cli_args: &PalimpsestArgs) -> Result<()> {
    let model = StaticModel::load(&args.models_dir)?;
    output_result(
        "Static model",
        &ModelReport {
            models_dir: args.models_dir.to_string_lossy().to_string(),
            summary: model.summary(),
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrected_path() {
        assert_eq!(
            corrected_path(Path::new("out"), Path::new("scans/page_01.txt")),
            PathBuf::from("out/page_01.corrected.txt")
        );
    }
}
