// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterizer capability. The engine never parses page content for painting
// itself; it asks a backend to turn a page into pixels.

use orbit_core::{PageError, PageSize, Result};

use crate::raster::frame::RasterFrame;

/// Opens documents for rendering.
pub trait PageRasterizer {
    /// Open `data`, supplying `password` when the document needs one.
    ///
    /// Fails with `Encrypted` when the password is required or wrong,
    /// `Load` on unparseable input, or `Rasterizer` when the backend itself
    /// is unavailable.
    fn open<'a>(
        &'a self,
        data: &'a [u8],
        password: Option<&'a str>,
    ) -> Result<Box<dyn RenderSession + 'a>>;
}

/// An opened document, rendered one page at a time.
pub trait RenderSession {
    fn page_count(&self) -> usize;

    /// Page size in document units (points), as displayed.
    fn page_size(&self, index: usize) -> Result<PageSize>;

    /// Render page `index` with `scale` pixels per point.
    fn render_page(&self, index: usize, scale: f32) -> std::result::Result<RasterFrame, PageError>;
}

/// Pixel dimensions of a page of `size` rendered at `scale`, never zero.
pub fn target_pixels(size: PageSize, scale: f32) -> (u32, u32) {
    let width = (size.width * scale).round().max(1.0) as u32;
    let height = (size.height * scale).round().max(1.0) as u32;
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_pixels_round_and_floor_at_one() {
        assert_eq!(target_pixels(PageSize::LETTER, 2.0), (1224, 1584));
        assert_eq!(target_pixels(PageSize { width: 0.1, height: 0.1 }, 1.0), (1, 1));
    }
}
