// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestrator — decode, quality gate, recognition, classification.
//
// Each invocation is stateless and request-scoped: decode the bytes, score
// sharpness, reject blurry uploads before any OCR cost is incurred, then
// recognise and classify. Every terminal verdict carries the perceptual
// fingerprint and wall-clock timing; decode failure is the only path that
// produces no verdict at all.

use std::time::Instant;

use docvet_core::config::PipelineConfig;
use docvet_core::error::Result;
use docvet_core::types::{ExtractedText, Fingerprint, Verdict, VerdictCode};
use tracing::{debug, info, instrument, warn};

use crate::decode::DecodedImage;
use crate::extract::classify;
use crate::fingerprint::compute_fingerprint;
use crate::ocr::{OcrConfig, OcrEngine, recognize};
use crate::sharpness::laplacian_variance;

/// Characters of recognised text carried in the verdict's diagnostic
/// snippet.
const SNIPPET_CHARS: usize = 800;

/// Placeholder confidence attached to classified verdicts until OCR token
/// confidences are wired through.
const PLACEHOLDER_CONFIDENCE: f64 = 0.7;

/// The document analysis pipeline.
///
/// Holds the resolved configuration and the OCR engine, both shared
/// read-only across requests — safe to call [`process`](Self::process)
/// concurrently from many workers.
pub struct DocumentPipeline {
    config: PipelineConfig,
    ocr: Option<OcrEngine>,
}

impl DocumentPipeline {
    /// Build a pipeline, loading OCR models as directed by the config.
    ///
    /// A missing or broken model installation does not fail construction:
    /// the pipeline runs with text recognition degraded to empty output,
    /// and every verdict on the full path comes back `OCR_MISMATCH`.
    pub fn new(config: PipelineConfig) -> Self {
        let ocr_config = match &config.ocr_model_dir {
            Some(dir) => OcrConfig::from_dir(dir),
            None => OcrConfig::default(),
        };
        let ocr = match OcrEngine::new(ocr_config) {
            Ok(engine) => Some(engine),
            Err(err) => {
                warn!(error = %err, "OCR engine unavailable; recognition degrades to empty text");
                None
            }
        };
        Self { config, ocr }
    }

    /// Build a pipeline around an explicit engine (or none, for degraded
    /// operation).
    pub fn with_engine(config: PipelineConfig, ocr: Option<OcrEngine>) -> Self {
        Self { config, ocr }
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether an OCR engine was loaded.
    pub fn ocr_available(&self) -> bool {
        self.ocr.is_some()
    }

    /// Analyse one uploaded image and produce a verdict.
    ///
    /// # Errors
    ///
    /// Only decode failures error out ([`DocvetError::UnrecognizedImage`] /
    /// [`DocvetError::ImageRead`], both client-input faults). Everything
    /// downstream degrades instead of failing, so a successfully decoded
    /// image always yields exactly one verdict.
    ///
    /// [`DocvetError::UnrecognizedImage`]: docvet_core::DocvetError::UnrecognizedImage
    /// [`DocvetError::ImageRead`]: docvet_core::DocvetError::ImageRead
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn process(&self, data: &[u8]) -> Result<Verdict> {
        let started = Instant::now();

        let image = DecodedImage::from_bytes(data)?;

        let gray = image.to_grayscale();
        let score = laplacian_variance(&gray);
        debug!(
            score,
            threshold = self.config.blur_threshold,
            "sharpness scored"
        );

        if score < self.config.blur_threshold {
            // Rejected before OCR — the whole point of the gate is to skip
            // that cost for images known to be unusable.
            let phash = compute_fingerprint(&image);
            info!(score, "upload rejected as too blurry");
            return Ok(Verdict {
                accepted: false,
                code: VerdictCode::Blur,
                reason: format!("Image too blurry (variance={score:.1})"),
                detected_type: None,
                detected_id: None,
                extracted: None,
                confidence: None,
                phash: Some(phash),
                processing_ms: elapsed_ms(started),
            });
        }

        let recognized = recognize(self.ocr.as_ref(), &image);
        let phash = compute_fingerprint(&image);

        Ok(classified_verdict(
            &recognized.text,
            phash,
            elapsed_ms(started),
        ))
    }
}

/// Assemble the terminal verdict for an image that passed the quality gate.
fn classified_verdict(text: &str, phash: Fingerprint, processing_ms: u64) -> Verdict {
    let classification = classify(text);

    let accepted = classification.kind.is_recognized();
    let reason = match &classification.identifier {
        Some(id) => format!(
            "Detected {}: {}",
            classification.kind.to_string().to_uppercase(),
            id
        ),
        None => format!("Detected type: {}", classification.kind),
    };
    let snippet: String = text.chars().take(SNIPPET_CHARS).collect();

    info!(
        accepted,
        detected_type = %classification.kind,
        "document classified"
    );

    Verdict {
        accepted,
        code: if accepted {
            VerdictCode::Ok
        } else {
            VerdictCode::OcrMismatch
        },
        reason,
        detected_type: Some(classification.kind),
        detected_id: classification.identifier,
        extracted: Some(ExtractedText {
            raw_text_snippet: snippet,
        }),
        confidence: Some(PLACEHOLDER_CONFIDENCE),
        phash: Some(phash),
        processing_ms,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
