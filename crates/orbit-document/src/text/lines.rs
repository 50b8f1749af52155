// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reading-order line grouping by vertical proximity.

use std::cmp::Ordering;

use crate::text::run::TextRun;

/// Runs whose baseline is within this distance of a line's first run join it.
pub const LINE_TOLERANCE: f32 = 8.0;

/// Runs sharing a visual line, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Concatenated run text, no separators; the diff key.
    pub text: String,
    pub runs: Vec<TextRun>,
}

impl Line {
    fn from_runs(mut runs: Vec<TextRun>) -> Self {
        runs.sort_by(|a, b| a.x().total_cmp(&b.x()));
        let text = runs.iter().map(|run| run.text.as_str()).collect();
        Self { text, runs }
    }
}

/// Top-to-bottom, then left-to-right.
fn reading_order(a: &TextRun, b: &TextRun) -> Ordering {
    b.y().total_cmp(&a.y()).then(a.x().total_cmp(&b.x()))
}

/// Group runs into lines: sort by descending y then ascending x, and start a
/// new line whenever a run's y is more than [`LINE_TOLERANCE`] from the
/// current line's anchor (its first run).
pub fn group_lines(mut runs: Vec<TextRun>) -> Vec<Line> {
    runs.sort_by(reading_order);

    let mut lines = Vec::new();
    let mut current: Vec<TextRun> = Vec::new();
    let mut anchor = f32::NAN;

    for run in runs {
        if current.is_empty() || (run.y() - anchor).abs() > LINE_TOLERANCE {
            if !current.is_empty() {
                lines.push(Line::from_runs(std::mem::take(&mut current)));
            }
            anchor = run.y();
        }
        current.push(run);
    }
    if !current.is_empty() {
        lines.push(Line::from_runs(current));
    }
    lines
}
