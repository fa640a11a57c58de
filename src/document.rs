//! Token files, sentence splitting and corrected output.
//!
//! Input documents are OCR token streams with one token per line, as written
//! by the upstream tokenizer. Sentences end at terminator tokens; other
//! punctuation-only tokens are dropped.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::{PalimpsestError, Result};

/// Tokens that close a sentence.
pub const SENTENCE_TERMINATORS: [&str; 7] = [".", "?", "!", ";", "/", "\"", "—"];

/// A document split into sentences of raw tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub sentences: Vec<Vec<String>>,
}

impl Document {
    pub fn from_tokens<S: Into<String>>(name: S, tokens: Vec<String>) -> Self {
        Document {
            name: name.into(),
            sentences: sentencize(tokens),
        }
    }

    /// Read and split the token file at `path`. The document is named after
    /// the file stem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let tokens = read_tokens(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let document = Document::from_tokens(name, tokens);
        info!(
            "Loaded {} sentences ({} tokens) from {}",
            document.sentences.len(),
            document.token_count(),
            path.display()
        );
        Ok(document)
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Vec::len).sum()
    }
}

/// Read one token per line. Invalid UTF-8 is replaced rather than rejected.
pub fn read_tokens<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PalimpsestError::file_missing(path));
    }
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(|line| line.trim().to_string())
        .collect())
}

/// Group tokens into sentences.
///
/// A terminator closes the current sentence if it has any tokens. Blank and
/// punctuation-only tokens are dropped. Tokens after the last terminator
/// form a final sentence.
pub fn sentencize<I>(tokens: I) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = String>,
{
    let mut sentences = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        if SENTENCE_TERMINATORS.contains(&token.as_str()) {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
        } else if !is_punctuation(&token) {
            current.push(token);
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

fn is_punctuation(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_punctuation())
}

/// Write one sentence per line, tokens separated by single spaces.
pub fn write_sentences<P: AsRef<Path>>(path: P, sentences: &[Vec<String>]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    for sentence in sentences {
        writeln!(writer, "{}", sentence.join(" "))?;
    }
    writer.flush()?;
    info!("Wrote {} sentences to {}", sentences.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_sentencize() {
        let sentences = sentencize(tokens(&[
            "Tha", "cot", ",", "saat", ".", ".", "It", "—", "was", "", "warm", "?", "Yes",
        ]));
        assert_eq!(
            sentences,
            vec![
                tokens(&["Tha", "cot", "saat"]),
                tokens(&["It"]),
                tokens(&["was", "warm"]),
                tokens(&["Yes"]),
            ]
        );
    }

    #[test]
    fn test_sentencize_keeps_inner_punctuation() {
        let sentences = sentencize(tokens(&["Darcy's", "self-same", "--", "hat", "!"]));
        assert_eq!(sentences, vec![tokens(&["Darcy's", "self-same", "hat"])]);
        assert!(sentencize(tokens(&[".", ",", "!"])).is_empty());
    }

    #[test]
    fn test_read_and_write() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.txt");
        fs::write(&input, b"Tha\ncot\nsa\xffat\n.\n").unwrap();

        let document = Document::load(&input).unwrap();
        assert_eq!(document.name, "page");
        assert_eq!(document.token_count(), 3);
        assert_eq!(document.sentences[0][2], "sa\u{fffd}at");

        let output = dir.path().join("page.corrected.txt");
        write_sentences(&output, &[tokens(&["the", "cat", "sat"]), tokens(&["yes"])]).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "the cat sat\nyes\n");
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = read_tokens(dir.path().join("absent.txt")).unwrap_err();
        assert!(err.is_configuration_error());
    }
}
