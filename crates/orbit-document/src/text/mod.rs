// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction and line grouping.

pub mod cmap;
pub mod extract;
pub mod layer;
pub mod lines;
pub mod run;

pub use layer::{ContentTextLayer, TextLayer};
pub use lines::{Line, group_lines};
pub use run::TextRun;
