// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterizer backed by a dynamically bound PDFium library.

use pdfium_render::prelude::*;
use orbit_core::{EngineError, PageError, PageSize, Result};
use tracing::{debug, info, instrument};

use crate::raster::backend::{PageRasterizer, RenderSession, target_pixels};
use crate::raster::frame::RasterFrame;

/// Renders pages through PDFium.
///
/// The library is looked up next to the executable first, then on the system
/// library path.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    #[instrument]
    pub fn bind() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|err| {
                EngineError::Rasterizer(format!("failed to bind to PDFium: {}", err))
            })?;
        info!("PDFium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn open<'a>(
        &'a self,
        data: &'a [u8],
        password: Option<&'a str>,
    ) -> Result<Box<dyn RenderSession + 'a>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(data, password)
            .map_err(|err| match err {
                PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                    EngineError::Encrypted("password required or incorrect".to_string())
                }
                other => EngineError::Load(format!("PDFium could not open document: {}", other)),
            })?;
        debug!(pages = document.pages().len(), "PDFium session opened");
        Ok(Box::new(PdfiumSession { document }))
    }
}

struct PdfiumSession<'a> {
    document: PdfDocument<'a>,
}

impl PdfiumSession<'_> {
    fn page(&self, index: usize) -> std::result::Result<PdfPage<'_>, String> {
        let index = u16::try_from(index).map_err(|_| format!("page index {} too large", index))?;
        self.document
            .pages()
            .get(index)
            .map_err(|err| err.to_string())
    }
}

impl RenderSession for PdfiumSession<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<PageSize> {
        let page = self.page(index).map_err(EngineError::InvalidArgument)?;
        Ok(PageSize {
            width: page.width().value,
            height: page.height().value,
        })
    }

    fn render_page(&self, index: usize, scale: f32) -> std::result::Result<RasterFrame, PageError> {
        let page = self
            .page(index)
            .map_err(|reason| PageError::render(index, reason))?;
        let size = PageSize {
            width: page.width().value,
            height: page.height().value,
        };
        let (width, height) = target_pixels(size, scale);
        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_maximum_height(height as i32)
            .render_form_data(true);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|err| PageError::render(index, err.to_string()))?;
        let (w, h) = (bitmap.width() as u32, bitmap.height() as u32);
        RasterFrame::new(w, h, bitmap.as_rgba_bytes().to_vec()).ok_or_else(|| {
            PageError::render(index, format!("bitmap of {}x{} has unexpected length", w, h))
        })
    }
}
