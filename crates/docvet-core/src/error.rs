// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Docvet.

use thiserror::Error;

/// Top-level error type for all Docvet operations.
#[derive(Debug, Error)]
pub enum DocvetError {
    // -- Decode errors (surfaced to the boundary as client-input faults) --
    #[error("unrecognized image format: {0}")]
    UnrecognizedImage(String),

    #[error("image read failed: {0}")]
    ImageRead(String),

    // -- Internal processing errors --
    #[error("OCR failed: {0}")]
    OcrError(String),
}

impl DocvetError {
    /// Whether this error is a client-input fault (bad upload) rather than a
    /// server-side failure. Decode errors are the only client-input category.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::UnrecognizedImage(_) | Self::ImageRead(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocvetError>;
