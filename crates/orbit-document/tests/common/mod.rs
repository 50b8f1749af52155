// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for the integration tests.

#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use orbit_core::{EngineConfig, EngineError, PageError, PageSize, RenderSettings, Result};
use orbit_document::pdf::handle::{DocumentHandle, LoadOptions};
use orbit_document::raster::backend::target_pixels;
use orbit_document::text::{ContentTextLayer, TextLayer};
use orbit_document::{Engine, PageRasterizer, RasterFrame, RenderSession};

/// Letter pages, one per entry, each showing its text in 24pt Helvetica.
pub fn labelled_pdf(labels: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for label in labels {
        let content = format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", label);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture saves");
    bytes
}

/// `prefix1`, `prefix2`, ... one page each.
pub fn numbered_pdf(prefix: &str, pages: usize) -> Vec<u8> {
    let labels: Vec<String> = (1..=pages).map(|n| format!("{}{}", prefix, n)).collect();
    let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    labelled_pdf(&refs)
}

/// Text of every page, runs concatenated.
pub fn labels(data: &[u8]) -> Vec<String> {
    let handle = DocumentHandle::load(data).expect("output loads");
    let layer = ContentTextLayer::new(&handle);
    (0..layer.page_count())
        .map(|index| {
            layer
                .page_runs(index)
                .expect("runs")
                .into_iter()
                .map(|run| run.text)
                .collect()
        })
        .collect()
}

pub fn page_count(data: &[u8]) -> usize {
    DocumentHandle::load(data).expect("output loads").page_count()
}

/// Renders solid white frames; listed pages fail. With `ignores_lock` it
/// reads past any visual-lock record, as a plain renderer would.
#[derive(Debug, Default)]
pub struct BlankRasterizer {
    pub failing_pages: Vec<usize>,
    pub ignores_lock: bool,
}

struct BlankSession<'a> {
    handle: DocumentHandle,
    failing_pages: &'a [usize],
}

impl PageRasterizer for BlankRasterizer {
    fn open<'a>(
        &'a self,
        data: &'a [u8],
        password: Option<&'a str>,
    ) -> Result<Box<dyn RenderSession + 'a>> {
        let handle = if self.ignores_lock {
            let mut document = Document::load_mem(data).map_err(|err| EngineError::Load(err.to_string()))?;
            document.trailer.remove(b"Info");
            let mut bytes = Vec::new();
            document
                .save_to(&mut bytes)
                .map_err(|err| EngineError::Save(err.to_string()))?;
            DocumentHandle::load(&bytes)?
        } else {
            DocumentHandle::load_with(
                data,
                LoadOptions {
                    password,
                    ..Default::default()
                },
            )?
        };
        Ok(Box::new(BlankSession {
            handle,
            failing_pages: &self.failing_pages,
        }))
    }
}

impl RenderSession for BlankSession<'_> {
    fn page_count(&self) -> usize {
        self.handle.page_count()
    }

    fn page_size(&self, index: usize) -> Result<PageSize> {
        Ok(self.handle.page_geometry(index)?.size())
    }

    fn render_page(&self, index: usize, scale: f32) -> std::result::Result<RasterFrame, PageError> {
        if self.failing_pages.contains(&index) {
            return Err(PageError::render(index, "render failed"));
        }
        let size = self
            .page_size(index)
            .map_err(|err| PageError::render(index, err.to_string()))?;
        let (width, height) = target_pixels(size, scale);
        Ok(RasterFrame::filled(width, height, [255, 255, 255, 255]))
    }
}

/// Engine with low raster scales so rebuilds stay small.
pub fn test_engine(rasterizer: BlankRasterizer) -> Engine {
    let small = RenderSettings::new(0.1, 0.9);
    let config = EngineConfig {
        raster: small,
        redaction_raster: small,
        compress_raster: small,
        ocr_raster: small,
        export_scale: 0.1,
        thumbnail_scale: 0.05,
        ..EngineConfig::default()
    };
    Engine::new(config).with_rasterizer(rasterizer)
}
