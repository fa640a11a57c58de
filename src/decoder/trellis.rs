//! Best-path scores and backpointers for one sentence.

use crate::error::{PalimpsestError, Result};

struct Column {
    candidates: Vec<String>,
    delta: Vec<f64>,
    psi: Vec<usize>,
}

/// The Viterbi lattice of one sentence, one column per token.
///
/// `delta[t][j]` is the best cumulative log-probability of any path ending at
/// candidate `j` of token `t`, and `psi[t][j]` the candidate of token `t - 1`
/// on that path. Ties go to the earliest candidate.
#[derive(Default)]
pub struct Trellis {
    columns: Vec<Column>,
}

impl Trellis {
    pub fn new() -> Self {
        Trellis::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Start the lattice with the first token's candidates and their
    /// initial-plus-emission scores.
    pub fn initialize(&mut self, candidates: Vec<String>, scores: Vec<f64>) -> Result<()> {
        check_column(&candidates, &scores)?;
        self.columns.clear();
        let psi = vec![0; candidates.len()];
        self.columns.push(Column {
            candidates,
            delta: scores,
            psi,
        });
        Ok(())
    }

    /// Add the next token's candidates with their emission scores.
    ///
    /// `transition(prev, next)` scores moving between adjacent candidates.
    pub fn induct<F>(
        &mut self,
        candidates: Vec<String>,
        emissions: Vec<f64>,
        mut transition: F,
    ) -> Result<()>
    where
        F: FnMut(&str, &str) -> f64,
    {
        check_column(&candidates, &emissions)?;
        let Some(prev) = self.columns.last() else {
            return Err(PalimpsestError::invariant(
                "trellis inducted before initialization",
            ));
        };

        let mut delta = Vec::with_capacity(candidates.len());
        let mut psi = Vec::with_capacity(candidates.len());
        for (next, emission) in candidates.iter().zip(&emissions) {
            let mut best = f64::NEG_INFINITY;
            let mut best_prev = 0;
            for (i, (word, score)) in prev.candidates.iter().zip(&prev.delta).enumerate() {
                let value = score + transition(word, next);
                if i == 0 || value > best {
                    best = value;
                    best_prev = i;
                }
            }
            delta.push(best + emission);
            psi.push(best_prev);
        }

        self.columns.push(Column {
            candidates,
            delta,
            psi,
        });
        Ok(())
    }

    /// Score of the best complete path.
    pub fn best_score(&self) -> Option<f64> {
        let last = self.columns.last()?;
        Some(last.delta[argmax(&last.delta)])
    }

    /// Follow the backpointers from the best final candidate.
    pub fn best_path(&self) -> Result<Vec<String>> {
        let Some(last) = self.columns.last() else {
            return Err(PalimpsestError::invariant("best path of an empty trellis"));
        };

        let mut index = argmax(&last.delta);
        let mut path = Vec::with_capacity(self.columns.len());
        for column in self.columns.iter().rev() {
            path.push(column.candidates[index].clone());
            index = column.psi[index];
        }
        path.reverse();
        Ok(path)
    }
}

fn check_column(candidates: &[String], scores: &[f64]) -> Result<()> {
    if candidates.is_empty() {
        return Err(PalimpsestError::invariant("token without candidates"));
    }
    if candidates.len() != scores.len() {
        return Err(PalimpsestError::invariant(format!(
            "{} candidates but {} scores",
            candidates.len(),
            scores.len()
        )));
    }
    Ok(())
}

/// Index of the first maximal value.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    best
}
