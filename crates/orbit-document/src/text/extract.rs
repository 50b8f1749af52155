// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text export.

use orbit_core::Result;
use tracing::{info, instrument};

use crate::pdf::handle::DocumentHandle;
use crate::text::layer::{ContentTextLayer, TextLayer};

/// Every page's runs joined by single spaces, each page framed as
/// `--- Page N ---`.
pub fn render_text(layer: &dyn TextLayer) -> Result<String> {
    let mut out = String::new();
    for index in 0..layer.page_count() {
        let runs = layer.page_runs(index)?;
        let text: Vec<&str> = runs.iter().map(|run| run.text.as_str()).collect();
        out.push_str(&format!("--- Page {} ---\n\n{}\n\n", index + 1, text.join(" ")));
    }
    Ok(out)
}

/// UTF-8 plain text of a document.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn extract_text(data: &[u8]) -> Result<Vec<u8>> {
    let handle = DocumentHandle::load(data)?;
    let text = render_text(&ContentTextLayer::new(&handle))?;
    info!(pages = handle.page_count(), chars = text.len(), "Text extracted");
    Ok(text.into_bytes())
}
