// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Searchable PDFs: page images with an invisible layer of recognized words.

#[cfg(feature = "ocr")]
pub mod ocrs_backend;

use orbit_core::{EngineError, PageError, PageSize, RenderSettings, Result};
use tracing::{debug, info, instrument, warn};

use crate::pdf::canvas::Canvas;
use crate::pdf::fonts::sanitize_text;
use crate::pdf::handle::DocumentHandle;
use crate::pdf::xobject::embed_jpeg;
use crate::raster::backend::{PageRasterizer, RenderSession};
use crate::raster::frame::RasterFrame;
use crate::raster::pipeline::open_session;

#[cfg(feature = "ocr")]
pub use ocrs_backend::{OcrsConfig, OcrsService};

/// Smallest font size used for the invisible text layer.
pub const MIN_WORD_SIZE: f32 = 2.0;

/// One recognized word. The box is in frame pixels with the origin at the
/// top-left corner, `(left, top, right, bottom)`.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub bbox: (f32, f32, f32, f32),
    /// Recognition confidence in `0..=1`; backends without scores report `1.0`.
    pub confidence: f32,
}

/// Text recognition over a rendered page.
pub trait OcrService {
    fn recognize(&self, frame: &RasterFrame) -> Result<Vec<OcrWord>>;
}

/// Baseline origin and font size in page units for a word recognized on a
/// `frame_w × frame_h` render of a `page` sized page.
pub fn word_placement(word: &OcrWord, frame_w: u32, frame_h: u32, page: PageSize) -> (f32, f32, f32) {
    let sx = page.width / frame_w.max(1) as f32;
    let sy = page.height / frame_h.max(1) as f32;
    let (left, top, _, bottom) = word.bbox;
    let size = ((bottom - top) * sy).max(MIN_WORD_SIZE);
    (left * sx, page.height - bottom * sy, size)
}

fn ocr_page(
    session: &dyn RenderSession,
    service: &dyn OcrService,
    index: usize,
    settings: RenderSettings,
    output: &mut DocumentHandle,
) -> std::result::Result<usize, PageError> {
    let size = session
        .page_size(index)
        .map_err(|err| PageError::render(index, err.to_string()))?;
    let frame = session.render_page(index, settings.scale)?;
    let words = service
        .recognize(&frame)
        .map_err(|err| PageError::render(index, err.to_string()))?;
    let jpeg = frame
        .encode_jpeg(settings.jpeg_quality())
        .map_err(|reason| PageError::encode(index, reason))?;
    let (width, height) = (frame.width, frame.height);
    drop(frame);

    let image = embed_jpeg(output.document_mut(), jpeg, width, height);
    let mut canvas = Canvas::new();
    canvas.image(image.id, 0.0, 0.0, size.width, size.height, 0.0, 1.0);
    for word in words.iter().filter(|word| !word.text.trim().is_empty()) {
        let (x, y, font_size) = word_placement(word, width, height, size);
        canvas.invisible_text(&sanitize_text(&word.text), x, y, font_size);
    }
    canvas
        .into_page(output, size)
        .map_err(|err| PageError::encode(index, err.to_string()))?;
    debug!(index, words = words.len(), "Page recognized");
    Ok(words.len())
}

/// Render every page, recognize it, and rebuild the document as page images
/// carrying the recognized words as invisible, selectable text. Pages are
/// processed one at a time; a failing page is logged and skipped.
#[instrument(skip_all, fields(bytes_len = data.len(), scale = settings.scale))]
pub fn ocr_pdf(
    rasterizer: &dyn PageRasterizer,
    service: &dyn OcrService,
    data: &[u8],
    password: Option<&str>,
    settings: RenderSettings,
) -> Result<Vec<u8>> {
    let session = open_session(rasterizer, data, password)?;
    let attempted = session.page_count();
    let mut output = DocumentHandle::new();

    let outcomes: Vec<std::result::Result<usize, PageError>> = (0..attempted)
        .map(|index| ocr_page(session.as_ref(), service, index, settings, &mut output))
        .collect();

    let mut words = 0;
    let mut skipped = 0;
    for outcome in outcomes {
        match outcome {
            Ok(count) => words += count,
            Err(err) => {
                warn!(page = err.page, kind = ?err.kind, reason = %err.reason, "Page skipped");
                skipped += 1;
            }
        }
    }
    if attempted > 0 && skipped == attempted {
        return Err(EngineError::NoRenderablePages { attempted });
    }
    info!(pages = attempted - skipped, skipped, words, "Searchable PDF built");
    output.save()
}
