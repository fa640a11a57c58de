//! Character alignment between an observed token and its true spelling.

use serde::{Deserialize, Serialize};

/// One step of an edit script, described from the OCR engine's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditOp {
    /// The observed string has a spurious character with no true counterpart.
    Inserted(char),
    /// A true character is missing from the observed string.
    Deleted(char),
    /// The true character was read as `observed` (equal characters included).
    Substituted { observed: char, truth: char },
}

/// Minimum unit-cost alignment of `observed` against `truth`.
///
/// The script lists every character of both strings exactly once, left to
/// right. Matching characters appear as `Substituted` with equal sides.
/// Among equal-cost alignments, diagonal steps are preferred, then
/// insertions, then deletions.
pub fn edit_ops(observed: &str, truth: &str) -> Vec<EditOp> {
    let obs: Vec<char> = observed.chars().collect();
    let tru: Vec<char> = truth.chars().collect();
    let (n, m) = (obs.len(), tru.len());

    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        table[0][j] = j;
    }
    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(obs[i - 1] != tru[j - 1]);
            table[i][j] = (table[i - 1][j - 1] + cost)
                .min(table[i - 1][j] + 1)
                .min(table[i][j - 1] + 1);
        }
    }

    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 {
            let cost = usize::from(obs[i - 1] != tru[j - 1]);
            if table[i][j] == table[i - 1][j - 1] + cost {
                ops.push(EditOp::Substituted {
                    observed: obs[i - 1],
                    truth: tru[j - 1],
                });
                i -= 1;
                j -= 1;
                continue;
            }
        }
        if i > 0 && table[i][j] == table[i - 1][j] + 1 {
            ops.push(EditOp::Inserted(obs[i - 1]));
            i -= 1;
        } else {
            ops.push(EditOp::Deleted(tru[j - 1]));
            j -= 1;
        }
    }
    ops.reverse();
    ops
}
