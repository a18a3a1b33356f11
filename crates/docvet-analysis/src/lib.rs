// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docvet-analysis — Document image analysis for the Docvet intake gate.
//
// Provides image decoding, sharpness scoring (Laplacian variance),
// perceptual fingerprinting (64-bit DCT hash), OCR text recognition, and
// identifier extraction, sequenced by a single stateless pipeline.

pub mod decode;
pub mod extract;
pub mod fingerprint;
pub mod ocr;
pub mod pipeline;
pub mod sharpness;

// Re-export the primary types so callers can use `docvet_analysis::DocumentPipeline` etc.
pub use decode::DecodedImage;
pub use extract::{Classification, classify};
pub use fingerprint::compute_fingerprint;
pub use ocr::{OcrConfig, OcrEngine, RecognizedLine, RecognizedText};
pub use pipeline::DocumentPipeline;
pub use sharpness::laplacian_variance;
