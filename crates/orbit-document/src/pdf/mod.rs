// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF object-graph layer: document handle, page copying and assembly,
// drawing, overlays, and forms.

pub mod assemble;
pub mod canvas;
pub mod clone;
pub mod fonts;
pub mod forms;
pub mod handle;
pub mod objects;
pub mod range;
pub mod stamp;
pub mod xobject;

pub use canvas::{Canvas, Color, TextStyle};
pub use handle::{DocumentHandle, LoadOptions, PageGeometry};
pub use range::parse_page_range;
