// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the blur-rejection threshold.
pub const BLUR_THRESHOLD_ENV: &str = "DOCVET_BLUR_THRESHOLD";

/// Environment variable holding the OCR model directory override.
pub const OCR_MODEL_DIR_ENV: &str = "DOCVET_OCR_MODEL_DIR";

/// Settings for a document analysis pipeline.
///
/// Resolved once at process start and handed to the pipeline constructor;
/// never re-read mid-request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum Laplacian variance an image must reach to pass the quality
    /// gate. Images scoring below this are rejected as too blurry.
    pub blur_threshold: f64,
    /// Directory containing the OCR detection/recognition models. `None`
    /// means the engine's default cache location.
    pub ocr_model_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_threshold: 110.0,
            ocr_model_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Build a config from process environment variables, falling back to
    /// defaults for anything absent or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let blur_threshold = std::env::var(BLUR_THRESHOLD_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or(defaults.blur_threshold);
        let ocr_model_dir = std::env::var(OCR_MODEL_DIR_ENV)
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        Self {
            blur_threshold,
            ocr_model_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_110() {
        let config = PipelineConfig::default();
        assert_eq!(config.blur_threshold, 110.0);
        assert!(config.ocr_model_dir.is_none());
    }

    #[test]
    fn from_env_falls_back_to_defaults_when_unset() {
        // Test processes don't define the DOCVET_* variables.
        let config = PipelineConfig::from_env();
        assert_eq!(config.blur_threshold, 110.0);
        assert!(config.ocr_model_dir.is_none());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = PipelineConfig {
            blur_threshold: 85.5,
            ocr_model_dir: Some(PathBuf::from("/opt/models")),
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let back: PipelineConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.blur_threshold, 85.5);
        assert_eq!(back.ocr_model_dir, Some(PathBuf::from("/opt/models")));
    }
}
