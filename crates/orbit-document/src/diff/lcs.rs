// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Longest-common-subsequence alignment of two line sequences.

use crate::text::lines::Line;

/// Lines present on only one side of a page comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    /// Lines of the first sequence with no match, in backtrack order.
    pub removed: Vec<Line>,
    /// Lines of the second sequence with no match, in backtrack order.
    pub added: Vec<Line>,
}

impl DiffResult {
    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// `(n + 1) x (m + 1)` LCS length table keyed on line text.
fn lcs_table(a: &[Line], b: &[Line]) -> Vec<Vec<u32>> {
    let mut dp = vec![vec![0u32; b.len() + 1]; a.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            dp[i][j] = if a[i - 1].text == b[j - 1].text {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }
    dp
}

/// Align `a` against `b` and report the unmatched lines.
///
/// Backtracking from the bottom-right corner steps diagonally on equal text.
/// Otherwise a line of `b` is consumed as added when its neighbour score is
/// at least that of `a`'s, so ties report an insertion rather than a
/// deletion.
pub fn diff_lines(a: &[Line], b: &[Line]) -> DiffResult {
    let dp = lcs_table(a, b);
    let mut result = DiffResult::default();
    let (mut i, mut j) = (a.len(), b.len());

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1].text == b[j - 1].text {
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
            result.added.push(b[j - 1].clone());
            j -= 1;
        } else {
            result.removed.push(a[i - 1].clone());
            i -= 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::run::TextRun;

    fn lines(texts: &[&str]) -> Vec<Line> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Line {
                text: text.to_string(),
                runs: vec![TextRun::upright(*text, 10.0, 700.0 - i as f32 * 20.0, 12.0, 50.0)],
            })
            .collect()
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn identical_sequences_have_no_changes() {
        let a = lines(&["one", "two", "three"]);
        assert!(diff_lines(&a, &a.clone()).is_unchanged());
    }

    #[test]
    fn changed_line_is_one_removal_and_one_addition() {
        let result = diff_lines(&lines(&["one", "two", "three"]), &lines(&["one", "2", "three"]));
        assert_eq!(texts(&result.removed), vec!["two"]);
        assert_eq!(texts(&result.added), vec!["2"]);
    }

    #[test]
    fn empty_side_reports_everything() {
        let a = lines(&["x", "y"]);
        let result = diff_lines(&a, &[]);
        assert_eq!(texts(&result.removed), vec!["y", "x"]);
        assert!(result.added.is_empty());

        let result = diff_lines(&[], &a);
        assert_eq!(texts(&result.added), vec!["y", "x"]);
        assert!(result.removed.is_empty());
    }

    /// Swapped lines tie; the tie goes to the second sequence.
    #[test]
    fn ties_prefer_added() {
        let result = diff_lines(&lines(&["a", "b"]), &lines(&["b", "a"]));
        assert_eq!(texts(&result.added), vec!["a"]);
        assert_eq!(texts(&result.removed), vec!["a"]);

        let result = diff_lines(&lines(&["p"]), &lines(&["q"]));
        assert_eq!(texts(&result.added), vec!["q"]);
        assert_eq!(texts(&result.removed), vec!["p"]);
    }
}
