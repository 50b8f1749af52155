// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// orbit-document: the document transformation engine behind Orbit.
//
// Structural operations (merge, split, organize, rotate, trim, overlays,
// forms, metadata) work on the `lopdf` object graph. Rasterization-backed
// operations (colour transforms, compression, visual-lock protection,
// redaction, image export, OCR) go through a pluggable page rasterizer.
// Text extraction and the line diff read content streams directly.

pub mod archive;
pub mod diff;
pub mod engine;
pub mod geometry;
pub mod ocr;
pub mod pdf;
pub mod protect;
pub mod raster;
pub mod redact;
pub mod repair;
pub mod text;

pub use engine::Engine;
pub use ocr::{OcrService, OcrWord};
pub use pdf::handle::DocumentHandle;
pub use protect::{ProtectionBackend, VisualLock};
pub use raster::{PageRasterizer, RasterFrame, RenderSession};
pub use repair::RepairStage;
pub use text::{TextLayer, TextRun};

#[cfg(feature = "ocr")]
pub use ocr::{OcrsConfig, OcrsService};
#[cfg(feature = "pdfium")]
pub use raster::PdfiumRasterizer;

/// In-memory fixtures shared by the unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use lopdf::{Document, Object, Stream, dictionary};
    use orbit_core::{EngineError, PageError, PageSize, Result};

    use crate::pdf::handle::{DocumentHandle, LoadOptions};
    use crate::raster::backend::{PageRasterizer, RenderSession, target_pixels};
    use crate::raster::frame::RasterFrame;
    use crate::text::layer::{ContentTextLayer, TextLayer};

    /// Letter-sized pages with the given raw content streams. `/F1` is
    /// Helvetica; the media box is inherited from the page tree root.
    pub fn pdf_with_content(contents: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for content in contents {
            let content_id = doc.add_object(Stream::new(
                lopdf::Dictionary::new(),
                content.as_bytes().to_vec(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::Reference(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
                "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    /// One page per label, each showing its label in 24pt Helvetica.
    pub fn fixture_pdf(labels: &[&str]) -> Vec<u8> {
        let contents: Vec<String> = labels
            .iter()
            .map(|label| format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", label))
            .collect();
        let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
        pdf_with_content(&refs)
    }

    /// Each page's extracted text, runs concatenated in content order.
    pub fn page_labels(data: &[u8]) -> Vec<String> {
        let handle = DocumentHandle::load(data).unwrap();
        let layer = ContentTextLayer::new(&handle);
        (0..layer.page_count())
            .map(|index| {
                layer
                    .page_runs(index)
                    .unwrap()
                    .into_iter()
                    .map(|run| run.text)
                    .collect()
            })
            .collect()
    }

    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([20, 90, 160, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    /// Rasterizer double: every page renders as a solid frame of the page's
    /// pixel size; pages listed in `failing_pages` fail to render. With
    /// `ignores_lock` it opens visual-locked input without a password, like
    /// any renderer that does not read the lock record.
    #[derive(Debug, Clone)]
    pub struct FakeRasterizer {
        pub failing_pages: Vec<usize>,
        pub fill: [u8; 4],
        pub ignores_lock: bool,
    }

    impl Default for FakeRasterizer {
        fn default() -> Self {
            Self {
                failing_pages: Vec::new(),
                fill: [200, 60, 40, 255],
                ignores_lock: false,
            }
        }
    }

    struct FakeSession<'a> {
        handle: DocumentHandle,
        rasterizer: &'a FakeRasterizer,
    }

    impl PageRasterizer for FakeRasterizer {
        fn open<'a>(
            &'a self,
            data: &'a [u8],
            password: Option<&'a str>,
        ) -> Result<Box<dyn RenderSession + 'a>> {
            let handle = if self.ignores_lock {
                without_info(data)?
            } else {
                DocumentHandle::load_with(
                    data,
                    LoadOptions {
                        password,
                        ignore_encryption: false,
                    },
                )?
            };
            Ok(Box::new(FakeSession {
                handle,
                rasterizer: self,
            }))
        }
    }

    /// The document with its /Info dictionary, and so any lock record, dropped.
    fn without_info(data: &[u8]) -> Result<DocumentHandle> {
        let mut document =
            Document::load_mem(data).map_err(|err| EngineError::Load(err.to_string()))?;
        document.trailer.remove(b"Info");
        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .map_err(|err| EngineError::Save(err.to_string()))?;
        DocumentHandle::load(&bytes)
    }

    impl RenderSession for FakeSession<'_> {
        fn page_count(&self) -> usize {
            self.handle.page_count()
        }

        fn page_size(&self, index: usize) -> Result<PageSize> {
            Ok(self.handle.page_geometry(index)?.size())
        }

        fn render_page(&self, index: usize, scale: f32) -> std::result::Result<RasterFrame, PageError> {
            if self.rasterizer.failing_pages.contains(&index) {
                return Err(PageError::render(index, "simulated render failure"));
            }
            let size = self
                .page_size(index)
                .map_err(|err| PageError::render(index, err.to_string()))?;
            let (width, height) = target_pixels(size, scale);
            Ok(RasterFrame::filled(width, height, self.rasterizer.fill))
        }
    }
}
