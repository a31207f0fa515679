// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition engine backed by `ocrs`, a pure-Rust OCR engine running neural
// network models through `rten`.
//
// # Feature Gate
//
// Only compiled with the `ocr` feature:
//
// ```toml
// lingolens-engine = { path = "crates/lingolens-engine", features = ["ocr"] }
// ```
//
// # Model Setup
//
// Each engine instance needs two model files:
//
// - **Detection model** (`text-detection.rten`) locates text regions.
// - **Recognition model** (`text-recognition.rten`) decodes characters.
//
// Running `ocrs-cli` once downloads them to `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`). Engines tuned to other scripts are
// configured by pointing a second instance at a different model directory.
//
// `ocrs` does not score its output, so every detection carries the
// configured `default_confidence`.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use lingolens_core::error::{LingolensError, Result};
use lingolens_core::{BoundingBox, Detection};
use ocrs::{ImageSource, OcrEngine as Ocrs, OcrEngineParams, TextItem};
use rten::Model;
use tracing::{debug, info, instrument};

use crate::recognizer::RecognitionEngine;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Confidence assigned to `ocrs` detections.
pub const DEFAULT_CONFIDENCE: f32 = 0.9;

/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Configuration for one [`OcrsEngine`].
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Engine name used in logs.
    pub name: String,
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
    /// Confidence reported for every detection.
    pub default_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir("ocrs", default_model_dir())
    }
}

impl OcrConfig {
    /// Models `text-detection.rten` and `text-recognition.rten` inside `dir`.
    pub fn from_dir(name: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            name: name.into(),
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
            default_confidence: DEFAULT_CONFIDENCE,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.default_confidence = confidence;
        self
    }

    fn unavailable(&self, reason: String) -> LingolensError {
        LingolensError::EngineUnavailable {
            engine: self.name.clone(),
            reason,
        }
    }

    /// Both model files exist and the confidence is a probability.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(self.unavailable(format!(
                    "model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(LingolensError::Config(format!(
                "default_confidence must be within [0, 1], got {}",
                self.default_confidence
            )));
        }
        Ok(())
    }
}

/// [`RecognitionEngine`] over an `ocrs` engine instance.
///
/// Loading models is the expensive step; construct once and reuse.
pub struct OcrsEngine {
    name: String,
    default_confidence: f32,
    engine: Ocrs,
}

impl OcrsEngine {
    #[instrument(skip_all, fields(
        engine = %config.name,
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        info!("loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path)
            .map_err(|err| config.unavailable(format!("failed to load detection model: {err}")))?;

        info!("loading OCR recognition model");
        let recognition_model = Model::load_file(&config.recognition_model_path)
            .map_err(|err| config.unavailable(format!("failed to load recognition model: {err}")))?;

        let engine = Ocrs::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| config.unavailable(format!("failed to initialise OCR engine: {err}")))?;

        Ok(Self {
            name: config.name,
            default_confidence: config.default_confidence,
            engine,
        })
    }

    fn unavailable(&self, reason: String) -> LingolensError {
        LingolensError::EngineUnavailable {
            engine: self.name.clone(),
            reason,
        }
    }
}

impl RecognitionEngine for OcrsEngine {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(engine = %self.name, width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height))
            .map_err(|err| self.unavailable(format!("bad image source ({width}x{height}): {err}")))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| self.unavailable(format!("preprocessing failed: {err}")))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| self.unavailable(format!("word detection failed: {err}")))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| self.unavailable(format!("line recognition failed: {err}")))?;

        let detections: Vec<Detection> = lines
            .iter()
            .flatten()
            .filter_map(|line| {
                let text = line.to_string();
                if text.trim().is_empty() {
                    return None;
                }
                let rect = line.bounding_rect();
                let bbox = BoundingBox::new(
                    rect.left() as f32,
                    rect.top() as f32,
                    rect.right() as f32,
                    rect.bottom() as f32,
                );
                Some(Detection::new(bbox, text, self.default_confidence))
            })
            .collect();

        debug!(words = word_rects.len(), detections = detections.len(), "recognition complete");
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dir_uses_well_known_filenames() {
        let config = OcrConfig::from_dir("devanagari", "/tmp/hindi-models");
        assert_eq!(config.name, "devanagari");
        assert_eq!(
            config.detection_model_path,
            PathBuf::from("/tmp/hindi-models/text-detection.rten")
        );
        assert_eq!(
            config.recognition_model_path,
            PathBuf::from("/tmp/hindi-models/text-recognition.rten")
        );
        assert_eq!(config.default_confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn missing_models_make_the_engine_unavailable() {
        let config = OcrConfig::from_dir("latin", "/nonexistent/ocr-models");
        assert!(matches!(
            OcrsEngine::new(config),
            Err(LingolensError::EngineUnavailable { .. })
        ));
    }

    #[test]
    fn confidence_outside_unit_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DETECTION_MODEL_FILENAME), b"").unwrap();
        std::fs::write(dir.path().join(RECOGNITION_MODEL_FILENAME), b"").unwrap();
        let config = OcrConfig::from_dir("latin", dir.path()).with_confidence(1.5);
        assert!(matches!(config.validate(), Err(LingolensError::Config(_))));
    }
}
