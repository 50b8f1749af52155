// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word recognition with the `ocrs` engine (neural models executed by `rten`).
//
// The engine needs two model files, `text-detection.rten` and
// `text-recognition.rten`. `ocrs-cli` downloads them to `~/.cache/ocrs` on
// first use; [`OcrsConfig::default`] looks there.

use std::path::{Path, PathBuf};

use ocrs::{ImageSource, OcrEngine, OcrEngineParams, TextItem};
use orbit_core::{EngineError, Result};
use rten::Model;
use tracing::{debug, info, instrument};

use crate::ocr::{OcrService, OcrWord};
use crate::raster::frame::RasterFrame;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `$XDG_CACHE_HOME/ocrs`, else `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the detection and recognition models.
#[derive(Debug, Clone)]
pub struct OcrsConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrsConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrsConfig {
    /// Both models from one directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(EngineError::Ocr(format!(
                    "model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

fn load_model(path: &Path) -> Result<Model> {
    Model::load_file(path).map_err(|err| {
        EngineError::Ocr(format!("failed to load model from {}: {}", path.display(), err))
    })
}

/// [`OcrService`] backed by `ocrs`. Model loading is the expensive step, so
/// build one and reuse it for every page.
pub struct OcrsService {
    engine: OcrEngine,
}

impl OcrsService {
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: &OcrsConfig) -> Result<Self> {
        config.validate()?;
        info!("Loading OCR models");
        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(load_model(&config.detection_model_path)?),
            recognition_model: Some(load_model(&config.recognition_model_path)?),
            ..Default::default()
        })
        .map_err(|err| EngineError::Ocr(format!("failed to initialise OCR engine: {}", err)))?;
        Ok(Self { engine })
    }
}

impl OcrService for OcrsService {
    #[instrument(skip_all, fields(width = frame.width, height = frame.height))]
    fn recognize(&self, frame: &RasterFrame) -> Result<Vec<OcrWord>> {
        let rgb = frame.to_rgb();
        let source = ImageSource::from_bytes(rgb.as_raw(), (frame.width, frame.height))
            .map_err(|err| EngineError::Ocr(format!("invalid image source: {}", err)))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| EngineError::Ocr(format!("preprocessing failed: {}", err)))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| EngineError::Ocr(format!("word detection failed: {}", err)))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| EngineError::Ocr(format!("line recognition failed: {}", err)))?;

        let mut words = Vec::new();
        for line in lines.iter().flatten() {
            for word in line.words() {
                let text = word.to_string();
                if text.trim().is_empty() {
                    continue;
                }
                let rect = word.bounding_rect();
                words.push(OcrWord {
                    text,
                    bbox: (
                        rect.left() as f32,
                        rect.top() as f32,
                        rect.right() as f32,
                        rect.bottom() as f32,
                    ),
                    confidence: 1.0,
                });
            }
        }
        debug!(lines = line_rects.len(), words = words.len(), "Words recognized");
        Ok(words)
    }
}
