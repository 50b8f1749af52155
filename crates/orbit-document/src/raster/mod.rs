// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterization: the rasterizer capability, the rasterize-and-rebuild
// pipeline, and page/image conversion built on it.

pub mod backend;
pub mod export;
pub mod frame;
pub mod import;
#[cfg(feature = "pdfium")]
pub mod pdfium;
pub mod pipeline;

pub use backend::{PageRasterizer, RenderSession};
pub use frame::RasterFrame;
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
pub use pipeline::{RebuildOptions, Rebuilt, rasterize_and_rebuild, rebuild};
