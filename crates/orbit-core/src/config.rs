// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::RenderSettings;

/// Tunables for every rasterization-backed and report-producing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default settings for rasterize-and-rebuild (grayscale, invert, protect, unlock, repair).
    pub raster: RenderSettings,
    /// Redaction finalizes at a higher scale for crisp text.
    pub redaction_raster: RenderSettings,
    /// Compression trades resolution for size.
    pub compress_raster: RenderSettings,
    /// Scale for page-to-image export.
    pub export_scale: f32,
    /// JPEG quality for page-to-image export.
    pub jpeg_export_quality: f32,
    /// Scale for UI thumbnails.
    pub thumbnail_scale: f32,
    /// Render settings for pages sent to the OCR service.
    pub ocr_raster: RenderSettings,
    /// Quality used when re-encoding non-JPEG/PNG images for image-to-PDF.
    pub image_import_quality: f32,
    /// Page number template with `{{current}}` / `{{total}}` placeholders.
    pub page_number_format: String,
    /// How far into the byte stream the repair step searches for `%PDF`.
    pub header_scan_limit: usize,
    /// Side-by-side comparison report layout.
    pub report: ReportConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            raster: RenderSettings::new(2.0, 0.95),
            redaction_raster: RenderSettings::new(2.5, 0.95),
            compress_raster: RenderSettings::new(1.5, 0.7),
            export_scale: 2.0,
            jpeg_export_quality: 0.8,
            thumbnail_scale: 0.3,
            ocr_raster: RenderSettings::new(2.0, 0.9),
            image_import_quality: 0.9,
            page_number_format: "Page {{current}} of {{total}}".to_string(),
            header_scan_limit: 2048,
            report: ReportConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Layout of the comparison report canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Maximum width/height each embedded source page is scaled into.
    pub slot_width: f32,
    pub slot_height: f32,
    pub highlight_opacity: f32,
    pub page_label: String,
    pub no_page_in_first: String,
    pub no_page_in_second: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1250.0,
            canvas_height: 900.0,
            slot_width: 600.0,
            slot_height: 800.0,
            highlight_opacity: 0.3,
            page_label: "Page".to_string(),
            no_page_in_first: "(No page in File 1)".to_string(),
            no_page_in_second: "(No page in File 2)".to_string(),
        }
    }
}
