// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-level document comparison.

pub mod lcs;
pub mod report;

pub use lcs::{DiffResult, diff_lines};
pub use report::{PageComparison, compare, diff_documents, diff_pages};
