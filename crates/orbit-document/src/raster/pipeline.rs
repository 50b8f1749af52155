// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterize-and-rebuild: render every page, optionally recolour it, re-encode
// it as JPEG and assemble a new document with one full-page image per page.

use lopdf::Document;
use orbit_core::{ColorMode, EngineError, PageError, PageSize, RenderSettings, Result};
use tracing::{debug, info, instrument, warn};

use crate::pdf::canvas::Canvas;
use crate::pdf::handle::DocumentHandle;
use crate::pdf::xobject::embed_jpeg;
use crate::protect;
use crate::raster::backend::{PageRasterizer, RenderSession};

/// Parameters for one rebuild.
#[derive(Debug, Clone, Copy, Default)]
pub struct RebuildOptions<'a> {
    /// Open password, forwarded to the rasterizer and checked against any
    /// visual-lock record.
    pub password: Option<&'a str>,
    pub color_mode: ColorMode,
    pub settings: RenderSettings,
}

/// A rebuilt, not yet serialised, image-only document.
pub struct Rebuilt {
    pub handle: DocumentHandle,
    /// Pages that made it into the output.
    pub rendered: usize,
    /// Pages that were skipped, in page order.
    pub skipped: Vec<PageError>,
}

/// Open a render session once any visual-lock record has accepted
/// `password`. Every rasterizing path goes through here, since a rasterizer
/// backend knows nothing about the lock.
pub fn open_session<'a>(
    rasterizer: &'a dyn PageRasterizer,
    data: &'a [u8],
    password: Option<&'a str>,
) -> Result<Box<dyn RenderSession + 'a>> {
    // The lock record lives in /Info, which is only readable without /Encrypt.
    if let Ok(document) = Document::load_mem(data)
        && !document.trailer.has(b"Encrypt")
    {
        protect::check_lock(&document, password)?;
    }
    rasterizer.open(data, password)
}

/// Rebuild and serialise.
pub fn rasterize_and_rebuild(
    rasterizer: &dyn PageRasterizer,
    data: &[u8],
    options: &RebuildOptions<'_>,
) -> Result<Vec<u8>> {
    rebuild(rasterizer, data, options)?.handle.save()
}

/// Render every page in order into a new image-only document.
///
/// A page that fails to render or encode is logged and skipped. The call fails
/// only when the input has pages and none of them survive. An input with no
/// pages yields a single blank A4 page.
#[instrument(skip_all, fields(bytes_len = data.len(), color_mode = ?options.color_mode, scale = options.settings.scale))]
pub fn rebuild(
    rasterizer: &dyn PageRasterizer,
    data: &[u8],
    options: &RebuildOptions<'_>,
) -> Result<Rebuilt> {
    let session = open_session(rasterizer, data, options.password)?;
    let attempted = session.page_count();
    let mut output = DocumentHandle::new();

    let outcomes: Vec<std::result::Result<usize, PageError>> = (0..attempted)
        .map(|index| rebuild_page(session.as_ref(), index, options, &mut output))
        .collect();

    let mut skipped = Vec::new();
    for outcome in outcomes {
        if let Err(err) = outcome {
            warn!(page = err.page, kind = ?err.kind, reason = %err.reason, "Page skipped");
            skipped.push(err);
        }
    }
    let rendered = attempted - skipped.len();

    if attempted == 0 {
        debug!("Input has no pages, emitting a blank placeholder");
        Canvas::new().into_page(&mut output, PageSize::A4)?;
    } else if rendered == 0 {
        return Err(EngineError::NoRenderablePages { attempted });
    }

    info!(attempted, rendered, skipped = skipped.len(), "Rebuild complete");
    Ok(Rebuilt {
        handle: output,
        rendered,
        skipped,
    })
}

/// Render, recolour, encode and append one page. The frame is dropped before
/// the next page is rendered.
fn rebuild_page(
    session: &dyn RenderSession,
    index: usize,
    options: &RebuildOptions<'_>,
    output: &mut DocumentHandle,
) -> std::result::Result<usize, PageError> {
    let size = session
        .page_size(index)
        .map_err(|err| PageError::render(index, err.to_string()))?;
    let mut frame = session.render_page(index, options.settings.scale)?;
    frame.apply_color_mode(options.color_mode);

    let jpeg = frame
        .encode_jpeg(options.settings.jpeg_quality())
        .map_err(|reason| PageError::encode(index, reason))?;
    let (width, height) = (frame.width, frame.height);
    drop(frame);

    let image = embed_jpeg(output.document_mut(), jpeg, width, height);
    let mut canvas = Canvas::new();
    canvas.image(image.id, 0.0, 0.0, size.width, size.height, 0.0, 1.0);
    canvas
        .into_page(output, size)
        .map_err(|err| PageError::encode(index, err.to_string()))?;
    debug!(index, width, height, "Page rebuilt");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::objects::page_content;
    use crate::testing::{FakeRasterizer, fixture_pdf, page_labels};

    fn settings() -> RenderSettings {
        RenderSettings::new(0.1, 0.9)
    }

    #[test]
    fn output_pages_are_image_only_and_keep_size() {
        let doc = fixture_pdf(&["alpha", "beta"]);
        let rebuilt = rebuild(
            &FakeRasterizer::default(),
            &doc,
            &RebuildOptions {
                settings: settings(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rebuilt.rendered, 2);
        let saved = rebuilt.handle.save().unwrap();

        assert_eq!(page_labels(&saved), vec!["", ""]);
        let handle = DocumentHandle::load(&saved).unwrap();
        let geometry = handle.page_geometry(1).unwrap();
        assert_eq!(geometry.size(), PageSize::LETTER);
        let page = handle
            .document()
            .get_dictionary(handle.page_id(0).unwrap())
            .unwrap();
        let content = String::from_utf8_lossy(&page_content(handle.document(), page)).into_owned();
        assert!(content.contains("Do"));
        assert!(!content.contains("BT"));
    }

    #[test]
    fn failing_page_is_skipped() {
        let doc = fixture_pdf(&["a", "b", "c"]);
        let rasterizer = FakeRasterizer {
            failing_pages: vec![1],
            ..Default::default()
        };
        let rebuilt = rebuild(
            &rasterizer,
            &doc,
            &RebuildOptions {
                settings: settings(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rebuilt.rendered, 2);
        assert_eq!(rebuilt.skipped.len(), 1);
        assert_eq!(rebuilt.skipped[0].page, 1);
        assert_eq!(rebuilt.handle.page_count(), 2);
    }

    #[test]
    fn all_pages_failing_is_an_error() {
        let doc = fixture_pdf(&["a", "b"]);
        let rasterizer = FakeRasterizer {
            failing_pages: vec![0, 1],
            ..Default::default()
        };
        let result = rasterize_and_rebuild(&rasterizer, &doc, &RebuildOptions::default());
        assert!(matches!(
            result,
            Err(EngineError::NoRenderablePages { attempted: 2 })
        ));
    }

    #[test]
    fn empty_input_gets_a_placeholder_page() {
        let empty = DocumentHandle::new().save().unwrap();
        let out = rasterize_and_rebuild(&FakeRasterizer::default(), &empty, &RebuildOptions::default())
            .unwrap();
        let handle = DocumentHandle::load(&out).unwrap();
        assert_eq!(handle.page_count(), 1);
        assert_eq!(handle.page_geometry(0).unwrap().size(), PageSize::A4);
    }

    #[test]
    fn lock_is_checked_before_the_rasterizer_opens() {
        let locked = crate::protect::protect(
            &FakeRasterizer::default(),
            &crate::protect::VisualLock,
            &fixture_pdf(&["a"]),
            &orbit_core::ProtectionIntent::with_password("open"),
            settings(),
        )
        .unwrap();
        let renderer = FakeRasterizer {
            ignores_lock: true,
            ..Default::default()
        };

        assert!(matches!(
            open_session(&renderer, &locked, None).err(),
            Some(EngineError::Encrypted(_))
        ));
        let session = open_session(&renderer, &locked, Some("open")).unwrap();
        assert_eq!(session.page_count(), 1);
    }
}
