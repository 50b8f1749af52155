// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-to-image export: per-page image archives and thumbnails.

use orbit_core::{EngineError, ExportFormat, PageError, Result};
use tracing::{info, instrument, warn};

use crate::archive::{build_archive, package_pages, page_entry_name};
use crate::raster::backend::PageRasterizer;
use crate::raster::pipeline::open_session;
use crate::raster::frame::RasterFrame;

/// Render each page at `scale` and encode it as `format`. Pages that fail are
/// logged and left out; an input whose every page fails is an error.
fn render_all(
    rasterizer: &dyn PageRasterizer,
    data: &[u8],
    password: Option<&str>,
    scale: f32,
    encode: impl Fn(&RasterFrame) -> std::result::Result<Vec<u8>, String>,
) -> Result<Vec<(usize, Vec<u8>)>> {
    let session = open_session(rasterizer, data, password)?;
    let attempted = session.page_count();
    let mut images = Vec::with_capacity(attempted);

    for index in 0..attempted {
        let encoded = session.render_page(index, scale).and_then(|frame| {
            encode(&frame).map_err(|reason| PageError::encode(index, reason))
        });
        match encoded {
            Ok(bytes) => images.push((index, bytes)),
            Err(err) => warn!(page = err.page, reason = %err.reason, "Page not exported"),
        }
    }

    if attempted > 0 && images.is_empty() {
        return Err(EngineError::NoRenderablePages { attempted });
    }
    Ok(images)
}

/// Zip archive of `<base>_page_<n>.jpg|png`, one entry per rendered page.
#[instrument(skip(rasterizer, data, password), fields(bytes_len = data.len()))]
pub fn pdf_to_images(
    rasterizer: &dyn PageRasterizer,
    data: &[u8],
    password: Option<&str>,
    base_name: &str,
    format: ExportFormat,
    scale: f32,
    jpeg_quality: u8,
) -> Result<Vec<u8>> {
    let images = render_all(rasterizer, data, password, scale, |frame| match format {
        ExportFormat::Jpeg => frame.encode_jpeg(jpeg_quality),
        ExportFormat::Png => frame.encode_png(),
    })?;

    // Entry numbers follow source pages, even when one was skipped.
    let entries: Vec<(String, Vec<u8>)> = images
        .into_iter()
        .map(|(index, bytes)| {
            (
                page_entry_name(base_name, index + 1, format.extension()),
                bytes,
            )
        })
        .collect();
    info!(images = entries.len(), "Pages exported");
    build_archive(&entries)
}

/// Small JPEG previews, one per rendered page, in page order.
#[instrument(skip(rasterizer, data, password), fields(bytes_len = data.len()))]
pub fn thumbnails(
    rasterizer: &dyn PageRasterizer,
    data: &[u8],
    password: Option<&str>,
    scale: f32,
    jpeg_quality: u8,
) -> Result<Vec<Vec<u8>>> {
    let images = render_all(rasterizer, data, password, scale, |frame| {
        frame.encode_jpeg(jpeg_quality)
    })?;
    Ok(images.into_iter().map(|(_, bytes)| bytes).collect())
}

/// Zip archive of the single-page documents produced by a burst split.
pub fn burst_archive(base_name: &str, pages: Vec<Vec<u8>>) -> Result<Vec<u8>> {
    package_pages(base_name, "pdf", pages)
}
