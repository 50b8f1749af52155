// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine facade: one entry point per operation, with settings taken from the
// engine configuration and backends supplied by the caller.

use orbit_core::{
    ColorMode, EngineConfig, EngineError, ExportFormat, Margins, MetadataFields,
    PageNumberPosition, ProtectionIntent, RenderSettings, Result, SignPlacement,
    WatermarkContent, WatermarkOptions,
};
use tracing::info;

use crate::archive;
use crate::diff::report::{self, PageComparison};
use crate::ocr::{self, OcrService};
use crate::pdf::{assemble, forms, stamp};
use crate::protect::{self, ProtectionBackend, VisualLock};
use crate::raster::backend::PageRasterizer;
use crate::raster::pipeline::{RebuildOptions, rasterize_and_rebuild};
use crate::raster::{export, import};
use crate::redact;
use crate::repair::{self, RepairOptions, RepairStage};
use crate::text::extract;

/// Every document operation, configured once.
///
/// Operations that only touch the object graph work without backends.
/// Rasterization-backed operations need a [`PageRasterizer`]; OCR needs an
/// [`OcrService`]. Protection defaults to [`VisualLock`].
pub struct Engine {
    config: EngineConfig,
    rasterizer: Option<Box<dyn PageRasterizer>>,
    ocr: Option<Box<dyn OcrService>>,
    protection: Box<dyn ProtectionBackend>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            rasterizer: None,
            ocr: None,
            protection: Box::new(VisualLock),
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: impl PageRasterizer + 'static) -> Self {
        self.rasterizer = Some(Box::new(rasterizer));
        self
    }

    pub fn with_ocr(mut self, service: impl OcrService + 'static) -> Self {
        self.ocr = Some(Box::new(service));
        self
    }

    pub fn with_protection(mut self, backend: impl ProtectionBackend + 'static) -> Self {
        self.protection = Box::new(backend);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn rasterizer(&self) -> Result<&dyn PageRasterizer> {
        self.rasterizer
            .as_deref()
            .ok_or_else(|| EngineError::Rasterizer("no page rasterizer configured".to_string()))
    }

    fn ocr_service(&self) -> Result<&dyn OcrService> {
        self.ocr
            .as_deref()
            .ok_or_else(|| EngineError::Ocr("no OCR service configured".to_string()))
    }

    // -- Structure ------------------------------------------------------------

    pub fn merge(&self, inputs: &[&[u8]]) -> Result<Vec<u8>> {
        assemble::merge(inputs)
    }

    pub fn split_range(&self, data: &[u8], range: &str) -> Result<Vec<u8>> {
        assemble::extract_range(data, range)
    }

    /// One single-page document per page, packaged as a zip archive.
    pub fn split_burst(&self, data: &[u8], file_name: &str) -> Result<Vec<u8>> {
        let pages = assemble::burst(data)?;
        export::burst_archive(archive::base_name(file_name), pages)
    }

    pub fn organize(&self, data: &[u8], order: &[usize]) -> Result<Vec<u8>> {
        assemble::organize(data, order)
    }

    pub fn rotate(&self, data: &[u8], degrees: i64) -> Result<Vec<u8>> {
        assemble::rotate(data, degrees)
    }

    pub fn trim(&self, data: &[u8], margins: &Margins) -> Result<Vec<u8>> {
        assemble::trim(data, margins)
    }

    pub fn edit_metadata(&self, data: &[u8], fields: &MetadataFields) -> Result<Vec<u8>> {
        assemble::edit_metadata(data, fields)
    }

    pub fn flatten(&self, data: &[u8]) -> Result<Vec<u8>> {
        forms::flatten(data)
    }

    pub fn remove_annotations(&self, data: &[u8]) -> Result<Vec<u8>> {
        forms::remove_annotations(data)
    }

    // -- Overlays -------------------------------------------------------------

    pub fn watermark(
        &self,
        data: &[u8],
        content: &WatermarkContent,
        options: &WatermarkOptions,
    ) -> Result<Vec<u8>> {
        stamp::watermark(data, content, options)
    }

    /// Page numbers using the configured template, or `template` when given.
    pub fn add_page_numbers(
        &self,
        data: &[u8],
        position: PageNumberPosition,
        template: Option<&str>,
    ) -> Result<Vec<u8>> {
        let template = template.unwrap_or(&self.config.page_number_format);
        stamp::add_page_numbers(data, position, template)
    }

    pub fn sign(&self, data: &[u8], signature_png: &[u8], placement: &SignPlacement) -> Result<Vec<u8>> {
        stamp::sign(data, signature_png, placement)
    }

    // -- Text -----------------------------------------------------------------

    pub fn extract_text(&self, data: &[u8]) -> Result<Vec<u8>> {
        extract::extract_text(data)
    }

    pub fn diff(&self, first: &[u8], second: &[u8]) -> Result<Vec<PageComparison>> {
        report::diff_documents(first, second)
    }

    /// Side-by-side report for exactly two `(file name, bytes)` inputs.
    pub fn compare(&self, files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
        report::compare(files, &self.config.report)
    }

    // -- Rasterization --------------------------------------------------------

    fn rebuild_with(&self, data: &[u8], color_mode: ColorMode, settings: RenderSettings) -> Result<Vec<u8>> {
        let options = RebuildOptions {
            password: None,
            color_mode,
            settings,
        };
        rasterize_and_rebuild(self.rasterizer()?, data, &options)
    }

    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.rebuild_with(data, ColorMode::Identity, self.config.compress_raster)
    }

    pub fn grayscale(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.rebuild_with(data, ColorMode::Grayscale, self.config.raster)
    }

    pub fn invert(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.rebuild_with(data, ColorMode::Invert, self.config.raster)
    }

    /// Rebuild with an arbitrary colour mode at the default raster settings.
    pub fn recolor(&self, data: &[u8], color_mode: ColorMode) -> Result<Vec<u8>> {
        self.rebuild_with(data, color_mode, self.config.raster)
    }

    pub fn protect(&self, data: &[u8], intent: &ProtectionIntent) -> Result<Vec<u8>> {
        protect::protect(
            self.rasterizer()?,
            self.protection.as_ref(),
            data,
            intent,
            self.config.raster,
        )
    }

    pub fn unlock(&self, data: &[u8], password: &str) -> Result<Vec<u8>> {
        protect::unlock(self.rasterizer()?, data, password, self.config.raster)
    }

    pub fn redact(&self, data: &[u8], terms: &[String], redact_numbers: bool) -> Result<Vec<u8>> {
        redact::redact(
            self.rasterizer()?,
            data,
            terms,
            redact_numbers,
            self.config.redaction_raster,
        )
    }

    /// Structural repair; `deep` finishes with a rasterized rebuild when a
    /// rasterizer is configured. Never fails.
    pub fn repair(&self, data: &[u8], deep: bool) -> (Vec<u8>, RepairStage) {
        let options = RepairOptions {
            force_rebuild: deep,
            settings: self.config.raster,
            header_scan_limit: self.config.header_scan_limit,
        };
        let (bytes, stage) = repair::repair(self.rasterizer.as_deref(), data, &options);
        info!(?stage, "Repair finished");
        (bytes, stage)
    }

    // -- Images ---------------------------------------------------------------

    /// `password` opens a visual-locked input; unlocked inputs ignore it.
    pub fn pdf_to_images(
        &self,
        data: &[u8],
        password: Option<&str>,
        file_name: &str,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        let quality = RenderSettings::new(self.config.export_scale, self.config.jpeg_export_quality);
        export::pdf_to_images(
            self.rasterizer()?,
            data,
            password,
            archive::base_name(file_name),
            format,
            quality.scale,
            quality.jpeg_quality(),
        )
    }

    pub fn thumbnails(&self, data: &[u8], password: Option<&str>) -> Result<Vec<Vec<u8>>> {
        let settings = RenderSettings::new(self.config.thumbnail_scale, self.config.jpeg_export_quality);
        export::thumbnails(
            self.rasterizer()?,
            data,
            password,
            settings.scale,
            settings.jpeg_quality(),
        )
    }

    pub fn images_to_pdf(&self, images: &[&[u8]]) -> Result<Vec<u8>> {
        let quality = RenderSettings::new(1.0, self.config.image_import_quality).jpeg_quality();
        import::images_to_pdf(images, quality)
    }

    pub fn ocr_pdf(&self, data: &[u8], password: Option<&str>) -> Result<Vec<u8>> {
        ocr::ocr_pdf(
            self.rasterizer()?,
            self.ocr_service()?,
            data,
            password,
            self.config.ocr_raster,
        )
    }
}
