//! Levenshtein edit distance.
//!
//! Both entry points work on Unicode scalar values and use a rolling pair of
//! rows, so memory is linear in the length of the second string. The row
//! step is exposed to the crate so that the trie matcher can extend one row
//! per trie edge instead of recomputing whole tables.

/// First row of the distance table for `query`: `0, 1, ..., query.len()`.
pub(crate) fn initial_row(query_len: usize) -> Vec<usize> {
    (0..=query_len).collect()
}

/// Extend a distance row by one character `ch` of the other string.
///
/// `prev[j]` is the distance between the consumed prefix and `query[..j]`.
pub(crate) fn next_row(prev: &[usize], query: &[char], ch: char) -> Vec<usize> {
    let mut row = Vec::with_capacity(prev.len());
    row.push(prev[0] + 1);
    for j in 1..prev.len() {
        let cost = usize::from(query[j - 1] != ch);
        let value = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
        row.push(value);
    }
    row
}

/// Calculate the Levenshtein distance between two strings.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let target: Vec<char> = s2.chars().collect();
    let mut row = initial_row(target.len());
    for ch in s1.chars() {
        row = next_row(&row, &target, ch);
    }
    row[target.len()]
}

/// Calculate the Levenshtein distance, giving up as soon as it must exceed
/// `threshold`. Returns `None` in that case.
pub fn levenshtein_distance_threshold(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let target: Vec<char> = s2.chars().collect();
    let source_len = s1.chars().count();

    if source_len.abs_diff(target.len()) > threshold {
        return None;
    }

    let mut row = initial_row(target.len());
    for ch in s1.chars() {
        row = next_row(&row, &target, ch);
        // Row minimum never decreases further down the table.
        if row.iter().min().is_some_and(|&min| min > threshold) {
            return None;
        }
    }

    let distance = row[target.len()];
    (distance <= threshold).then_some(distance)
}
