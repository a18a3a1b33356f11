// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition for uploaded document images, using the `ocrs` crate —
// a pure-Rust OCR engine backed by neural network models executed via `rten`.
//
// The engine needs two model files:
//
// - **Detection model** (`text-detection.rten`) — locates text regions.
// - **Recognition model** (`text-recognition.rten`) — decodes characters.
//
// Models can be downloaded from the ocrs-models repository, or obtained
// automatically by running the `ocrs-cli` tool once:
//   ```sh
//   cargo install ocrs-cli
//   ocrs some-image.png  # downloads models to ~/.cache/ocrs/
//   ```
//
// Recognition failures never propagate out of this module: callers go
// through [`recognize`], which degrades to empty output instead.

use std::path::{Path, PathBuf};

use docvet_core::error::{DocvetError, Result};
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams, TextItem};
use rten::Model;
use rten_imageproc::BoundingRect;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::decode::DecodedImage;

/// Default directory for cached OCR model files.
///
/// Follows the XDG Base Directory specification: `$XDG_CACHE_HOME/ocrs`,
/// falling back to `~/.cache/ocrs` when `XDG_CACHE_HOME` is unset.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        // Last resort — current directory.
        PathBuf::from("ocrs-models")
    }
}

/// Well-known filenames for the detection and recognition models.
const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Configuration for constructing an [`OcrEngine`].
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path to the text-detection model file (`.rten`).
    pub detection_model_path: PathBuf,
    /// Path to the text-recognition model file (`.rten`).
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    /// Returns a config pointing at the default model cache directory.
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Create a config with an explicit model directory.
    ///
    /// Expects the directory to contain `text-detection.rten` and
    /// `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Create a config pointing at two specific model files.
    pub fn from_paths(
        detection_model: impl Into<PathBuf>,
        recognition_model: impl Into<PathBuf>,
    ) -> Self {
        Self {
            detection_model_path: detection_model.into(),
            recognition_model_path: recognition_model.into(),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        if !self.detection_model_path.exists() {
            return Err(DocvetError::OcrError(format!(
                "detection model not found at {}; run `ocrs-cli` once to download models",
                self.detection_model_path.display()
            )));
        }
        if !self.recognition_model_path.exists() {
            return Err(DocvetError::OcrError(format!(
                "recognition model not found at {}; run `ocrs-cli` once to download models",
                self.recognition_model_path.display()
            )));
        }
        Ok(())
    }
}

/// A line of text recognised in a document image, with its bounding box in
/// image coordinates (`[left, top, right, bottom]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedLine {
    pub text: String,
    pub bounds: [f32; 4],
}

/// The output of text recognition on one image.
///
/// `text` may be empty but is never absent: engine failure yields an empty
/// string, not an error state. `lines` is `None` when structured output is
/// unavailable — a layout failure never blocks identifier extraction, which
/// only needs `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedText {
    pub text: String,
    pub lines: Option<Vec<RecognizedLine>>,
}

impl RecognizedText {
    /// The fully degraded result: no text, no structured output.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            lines: None,
        }
    }
}

/// OCR engine for document images.
///
/// Wraps the `ocrs` engine with Docvet error handling and logging. The
/// engine is initialised once with pre-trained models at pipeline
/// construction and reused for every request.
///
/// **Important:** the `ocrs` and `rten` crates must be compiled in release
/// mode; debug builds are 10-100x slower.
pub struct OcrEngine {
    /// The underlying `ocrs` engine instance.
    engine: OcrsEngine,
}

impl OcrEngine {
    /// Create a new OCR engine, loading models from the paths in `config`.
    ///
    /// Model loading is the expensive step — keep the engine around and
    /// call the recognition methods for each image.
    ///
    /// # Errors
    ///
    /// Returns [`DocvetError::OcrError`] if model files are missing or
    /// corrupt.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            DocvetError::OcrError(format!(
                "failed to load detection model from {}: {}",
                config.detection_model_path.display(),
                err
            ))
        })?;

        info!("Loading OCR recognition model");
        let recognition_model =
            Model::load_file(&config.recognition_model_path).map_err(|err| {
                DocvetError::OcrError(format!(
                    "failed to load recognition model from {}: {}",
                    config.recognition_model_path.display(),
                    err
                ))
            })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| DocvetError::OcrError(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine initialised successfully");
        Ok(Self { engine })
    }

    /// Create an OCR engine loading models from a specific directory.
    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(OcrConfig::from_dir(dir))
    }

    /// Extract all text from a document image as a single string, lines
    /// separated by newlines.
    ///
    /// # Errors
    ///
    /// Returns [`DocvetError::OcrError`] if preprocessing or recognition
    /// fails. Callers inside the pipeline go through [`recognize`], which
    /// converts this into empty text instead.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn recognize_text(&self, image: &DynamicImage) -> Result<String> {
        let input = self.prepare(image)?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| DocvetError::OcrError(format!("text recognition failed: {err}")))?;

        debug!(
            line_count = text.lines().count(),
            char_count = text.len(),
            "OCR recognition complete"
        );
        Ok(text)
    }

    /// Extract text line by line with bounding boxes.
    ///
    /// More expensive than [`recognize_text`](Self::recognize_text) but
    /// preserves spatial information for diagnostic output.
    ///
    /// # Errors
    ///
    /// Returns [`DocvetError::OcrError`] if detection or recognition fails.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn recognize_lines(&self, image: &DynamicImage) -> Result<Vec<RecognizedLine>> {
        let input = self.prepare(image)?;

        // Step 1: Detect word bounding boxes.
        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| DocvetError::OcrError(format!("word detection failed: {err}")))?;
        debug!(word_count = word_rects.len(), "Words detected");

        // Step 2: Group words into text lines.
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        debug!(line_count = line_rects.len(), "Text lines found");

        // Step 3: Recognise characters within each line.
        let line_texts = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| DocvetError::OcrError(format!("line recognition failed: {err}")))?;

        // Build the result, dropping empty lines.
        let mut results = Vec::with_capacity(line_texts.len());
        for line in line_texts.iter().flatten() {
            let text = line.to_string();
            if text.trim().is_empty() {
                continue;
            }

            let rect = line.rotated_rect().bounding_rect();
            results.push(RecognizedLine {
                text,
                bounds: [rect.left(), rect.top(), rect.right(), rect.bottom()],
            });
        }

        debug!(recognized_lines = results.len(), "Layout-aware OCR complete");
        Ok(results)
    }

    /// Convert an image into the engine's input representation.
    fn prepare(&self, image: &DynamicImage) -> Result<ocrs::OcrInput> {
        // ocrs expects RGB8.
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            DocvetError::OcrError(format!(
                "failed to create image source ({width}x{height}): {err}"
            ))
        })?;

        self.engine
            .prepare_input(source)
            .map_err(|err| DocvetError::OcrError(format!("OCR preprocessing failed: {err}")))
    }
}

/// Run both recognition passes over an image, degrading instead of failing.
///
/// The full-text and layout extractions are independent: either may fail
/// without affecting the other. With no engine at all (models unavailable
/// at startup), both degrade at once.
#[instrument(skip_all, fields(engine_available = engine.is_some()))]
pub fn recognize(engine: Option<&OcrEngine>, image: &DecodedImage) -> RecognizedText {
    let Some(engine) = engine else {
        debug!("no OCR engine loaded; returning empty recognition");
        return RecognizedText::empty();
    };

    let text = match engine.recognize_text(image.as_dynamic()) {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "full-text recognition failed; degrading to empty text");
            String::new()
        }
    };

    let lines = match engine.recognize_lines(image.as_dynamic()) {
        Ok(lines) => Some(lines),
        Err(err) => {
            warn!(error = %err, "layout recognition failed; structured output unavailable");
            None
        }
    };

    RecognizedText { text, lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    #[test]
    fn default_config_points_to_cache_dir() {
        let config = OcrConfig::default();
        let path_str = config.detection_model_path.to_string_lossy();
        assert!(
            path_str.ends_with(DETECTION_MODEL_FILENAME),
            "detection model path should end with {DETECTION_MODEL_FILENAME}, got {path_str}"
        );
        let rec_str = config.recognition_model_path.to_string_lossy();
        assert!(
            rec_str.ends_with(RECOGNITION_MODEL_FILENAME),
            "recognition model path should end with {RECOGNITION_MODEL_FILENAME}, got {rec_str}"
        );
    }

    #[test]
    fn config_from_dir() {
        let config = OcrConfig::from_dir("/tmp/my-models");
        assert_eq!(
            config.detection_model_path,
            PathBuf::from("/tmp/my-models/text-detection.rten")
        );
        assert_eq!(
            config.recognition_model_path,
            PathBuf::from("/tmp/my-models/text-recognition.rten")
        );
    }

    #[test]
    fn validate_fails_for_missing_models() {
        let empty_dir = tempfile::tempdir().expect("tempdir");
        let config = OcrConfig::from_dir(empty_dir.path());
        assert!(config.validate().is_err());
    }

    #[test]
    fn engine_construction_fails_without_models() {
        let empty_dir = tempfile::tempdir().expect("tempdir");
        let result = OcrEngine::from_model_dir(empty_dir.path());
        assert!(matches!(result, Err(DocvetError::OcrError(_))));
    }

    #[test]
    fn recognize_without_engine_degrades_to_empty() {
        let image = crate::decode::DecodedImage::from_dynamic(DynamicImage::ImageRgb8(
            RgbImage::from_pixel(32, 32, Rgb([255, 255, 255])),
        ));
        let recognized = recognize(None, &image);
        assert_eq!(recognized.text, "");
        assert!(recognized.lines.is_none());
    }
}
