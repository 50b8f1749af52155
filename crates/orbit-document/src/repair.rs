// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structural repair. Each stage degrades gracefully to the previous stage's
// output, so repair always returns bytes.

use orbit_core::RenderSettings;
use tracing::{info, instrument, warn};

use crate::pdf::assemble::copy_pages;
use crate::pdf::handle::{DocumentHandle, LoadOptions};
use crate::raster::backend::PageRasterizer;
use crate::raster::pipeline::{RebuildOptions, rasterize_and_rebuild};

const MAGIC: &[u8] = b"%PDF";
const FALLBACK_HEADER: &[u8] = b"%PDF-1.4\n";

#[derive(Debug, Clone, Copy)]
pub struct RepairOptions {
    /// Finish by rasterizing the structurally repaired document.
    pub force_rebuild: bool,
    pub settings: RenderSettings,
    /// Bytes searched for a misplaced `%PDF` signature.
    pub header_scan_limit: usize,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            force_rebuild: false,
            settings: RenderSettings::default(),
            header_scan_limit: 2048,
        }
    }
}

/// Which stage produced the repaired bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStage {
    Sanitized,
    Rebuilt,
    Rasterized,
}

/// Make the byte stream start with `%PDF`: leading garbage within
/// `scan_limit` bytes is trimmed, otherwise a minimal header is prepended.
pub fn sanitize_header(data: &[u8], scan_limit: usize) -> Vec<u8> {
    if data.starts_with(MAGIC) {
        return data.to_vec();
    }
    let limit = data.len().min(scan_limit);
    let found = data
        .windows(MAGIC.len())
        .take(limit)
        .position(|window| window == MAGIC);
    match found {
        Some(offset) => {
            warn!(offset, "Garbage before PDF header, trimmed");
            data[offset..].to_vec()
        }
        None => {
            warn!("No PDF header found, prepending a default one");
            let mut fixed = FALLBACK_HEADER.to_vec();
            fixed.extend_from_slice(data);
            fixed
        }
    }
}

fn tolerant_load(data: &[u8]) -> orbit_core::Result<DocumentHandle> {
    DocumentHandle::load_with(
        data,
        LoadOptions {
            ignore_encryption: true,
            ..Default::default()
        },
    )
}

/// Load and re-save, regenerating the cross-reference table.
fn shallow_repair(data: &[u8]) -> Option<Vec<u8>> {
    match tolerant_load(data).and_then(DocumentHandle::save) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            warn!(%err, "Shallow repair failed, continuing");
            None
        }
    }
}

/// Copy every page into a brand-new document.
fn strong_repair(data: &[u8]) -> orbit_core::Result<Vec<u8>> {
    let source = tolerant_load(data)?;
    let mut rebuilt = DocumentHandle::new();
    let all: Vec<usize> = (0..source.page_count()).collect();
    copy_pages(&source, &all, &mut rebuilt)?;
    rebuilt.save()
}

/// Repair `data`, returning the best output reached and the stage that
/// produced it. Never fails.
#[instrument(skip_all, fields(bytes_len = data.len(), force_rebuild = options.force_rebuild))]
pub fn repair(
    rasterizer: Option<&dyn PageRasterizer>,
    data: &[u8],
    options: &RepairOptions,
) -> (Vec<u8>, RepairStage) {
    let sanitized = sanitize_header(data, options.header_scan_limit);
    let shallow = shallow_repair(&sanitized);
    let input = shallow.as_deref().unwrap_or(&sanitized);

    let (structural, stage) = match strong_repair(input) {
        Ok(bytes) => (bytes, RepairStage::Rebuilt),
        Err(err) => {
            warn!(%err, "Strong repair failed, using sanitized bytes");
            (sanitized.clone(), RepairStage::Sanitized)
        }
    };

    if !options.force_rebuild {
        info!(?stage, output_bytes = structural.len(), "Repair complete");
        return (structural, stage);
    }

    let Some(rasterizer) = rasterizer else {
        warn!("Deep repair requested without a rasterizer, keeping structural result");
        return (structural, stage);
    };
    let rebuild = RebuildOptions {
        settings: options.settings,
        ..Default::default()
    };
    match rasterize_and_rebuild(rasterizer, &structural, &rebuild) {
        Ok(bytes) => {
            info!(output_bytes = bytes.len(), "Deep repair complete");
            (bytes, RepairStage::Rasterized)
        }
        Err(err) => {
            warn!(%err, "Deep repair failed, keeping structural result");
            (structural, stage)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRasterizer, fixture_pdf, page_labels};

    #[test]
    fn header_is_found_or_prepended() {
        assert_eq!(sanitize_header(b"%PDF-1.7 rest", 2048), b"%PDF-1.7 rest");
        assert_eq!(sanitize_header(b"junk\n%PDF-1.5 x", 2048), b"%PDF-1.5 x");
        assert_eq!(sanitize_header(b"plain", 2048), b"%PDF-1.4\nplain");

        let mut far = vec![b'x'; 3000];
        far.extend_from_slice(b"%PDF-1.3");
        assert!(sanitize_header(&far, 2048).starts_with(b"%PDF-1.4\nxxx"));
    }

    #[test]
    fn garbage_still_returns_bytes() {
        let (bytes, stage) = repair(None, b"\x00\x01 definitely not a document", &RepairOptions::default());
        assert_eq!(stage, RepairStage::Sanitized);
        assert!(bytes.starts_with(b"%PDF-1.4\n"));

        let (empty, _) = repair(None, b"", &RepairOptions::default());
        assert_eq!(empty, b"%PDF-1.4\n");
    }

    #[test]
    fn leading_garbage_is_repaired_structurally() {
        let mut data = b"GARBAGE".to_vec();
        data.extend(fixture_pdf(&["one", "two"]));
        let (bytes, stage) = repair(None, &data, &RepairOptions::default());
        assert_eq!(stage, RepairStage::Rebuilt);
        assert_eq!(page_labels(&bytes), vec!["one", "two"]);
    }

    #[test]
    fn deep_repair_falls_back_when_rasterizing_fails() {
        let doc = fixture_pdf(&["one"]);
        let broken = FakeRasterizer {
            failing_pages: vec![0],
            ..Default::default()
        };
        let options = RepairOptions {
            force_rebuild: true,
            settings: RenderSettings::new(0.1, 0.8),
            ..Default::default()
        };
        let (_, stage) = repair(Some(&broken), &doc, &options);
        assert_eq!(stage, RepairStage::Rebuilt);

        let (_, stage) = repair(Some(&FakeRasterizer::default()), &doc, &options);
        assert_eq!(stage, RepairStage::Rasterized);
    }
}
