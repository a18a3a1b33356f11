// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Docvet document intake gate.

use serde::{Deserialize, Serialize};

/// Identity-document categories the classifier can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Permanent Account Number card (5 letters, 4 digits, 1 letter).
    Pan,
    /// Aadhaar-style national ID (three 4-digit groups).
    Aadhaar,
    /// Passport booklet (1 letter followed by 7 digits).
    Passport,
    /// Text-dense page that matched no identifier pattern.
    Document,
    /// Nothing recognisable.
    Unknown,
}

impl DocumentKind {
    /// Whether this classification counts as an identified document.
    /// `Unknown` is the only kind that does not.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pan => "pan",
            Self::Aadhaar => "aadhaar",
            Self::Passport => "passport",
            Self::Document => "document",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Machine-readable outcome category of a pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictCode {
    /// Image passed the quality gate and was classified.
    Ok,
    /// Image rejected by the sharpness gate; OCR was skipped.
    Blur,
    /// Image was sharp enough but no document type could be recognised.
    OcrMismatch,
}

/// A 64-bit perceptual fingerprint, encoded as 16 lowercase hex characters.
///
/// Visually similar images map to fingerprints with low bit-distance, so the
/// caller can use [`Fingerprint::distance`] for near-duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hex digits in the string encoding (64 bits).
    pub const HEX_WIDTH: usize = 16;

    /// Encode a raw 64-bit hash.
    pub fn from_bits(bits: u64) -> Self {
        Self(format!("{bits:016x}"))
    }

    /// The hex string encoding.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hamming distance between two fingerprints, in bits.
    ///
    /// Returns `None` if either side is not a valid 64-bit hex encoding.
    pub fn distance(&self, other: &Fingerprint) -> Option<u32> {
        let a = u64::from_str_radix(&self.0, 16).ok()?;
        let b = u64::from_str_radix(&other.0, 16).ok()?;
        Some((a ^ b).count_ones())
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Diagnostic payload attached to classified verdicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    /// First 800 characters of the recognised text.
    pub raw_text_snippet: String,
}

/// The response entity of a pipeline invocation.
///
/// Created once per request by the orchestrator; immutable; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Final admit/reject decision.
    pub accepted: bool,
    /// Machine-readable outcome category.
    pub code: VerdictCode,
    /// Human-readable explanation.
    pub reason: String,
    /// Classification result; absent on blur rejection.
    pub detected_type: Option<DocumentKind>,
    /// Extracted identifier; absent if none was found.
    pub detected_id: Option<String>,
    /// Diagnostic text payload; absent on blur rejection.
    pub extracted: Option<ExtractedText>,
    /// Placeholder confidence; present on classified verdicts only.
    pub confidence: Option<f64>,
    /// Perceptual fingerprint; present on every terminal path after a
    /// successful decode.
    pub phash: Option<Fingerprint>,
    /// Wall-clock time for the whole invocation, in milliseconds.
    pub processing_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_kind_wire_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&DocumentKind::Pan).unwrap(), "\"pan\"");
        assert_eq!(
            serde_json::to_string(&DocumentKind::Aadhaar).unwrap(),
            "\"aadhaar\""
        );
        assert_eq!(
            serde_json::to_string(&DocumentKind::Unknown).unwrap(),
            "\"unknown\""
        );
    }

    #[test]
    fn verdict_code_wire_names_are_screaming_snake() {
        assert_eq!(serde_json::to_string(&VerdictCode::Ok).unwrap(), "\"OK\"");
        assert_eq!(serde_json::to_string(&VerdictCode::Blur).unwrap(), "\"BLUR\"");
        assert_eq!(
            serde_json::to_string(&VerdictCode::OcrMismatch).unwrap(),
            "\"OCR_MISMATCH\""
        );
    }

    #[test]
    fn only_unknown_is_unrecognized() {
        assert!(DocumentKind::Pan.is_recognized());
        assert!(DocumentKind::Aadhaar.is_recognized());
        assert!(DocumentKind::Passport.is_recognized());
        assert!(DocumentKind::Document.is_recognized());
        assert!(!DocumentKind::Unknown.is_recognized());
    }

    #[test]
    fn fingerprint_encodes_fixed_width_hex() {
        let fp = Fingerprint::from_bits(0x1);
        assert_eq!(fp.as_str(), "0000000000000001");
        assert_eq!(fp.as_str().len(), Fingerprint::HEX_WIDTH);
    }

    #[test]
    fn fingerprint_distance_counts_differing_bits() {
        let zeros = Fingerprint::from_bits(0);
        let ones = Fingerprint::from_bits(u64::MAX);
        assert_eq!(zeros.distance(&zeros), Some(0));
        assert_eq!(zeros.distance(&ones), Some(64));
        assert_eq!(
            Fingerprint::from_bits(0b1011).distance(&Fingerprint::from_bits(0b0010)),
            Some(2)
        );
    }

    #[test]
    fn fingerprint_distance_rejects_malformed_hex() {
        let good = Fingerprint::from_bits(42);
        let bad = Fingerprint("not-hex-at-all".to_string());
        assert_eq!(good.distance(&bad), None);
    }

    #[test]
    fn fingerprint_serializes_transparently() {
        let fp = Fingerprint::from_bits(0xdeadbeef);
        assert_eq!(
            serde_json::to_string(&fp).unwrap(),
            "\"00000000deadbeef\""
        );
    }

    #[test]
    fn verdict_serializes_with_wire_field_names() {
        let verdict = Verdict {
            accepted: true,
            code: VerdictCode::Ok,
            reason: "Detected PAN: ABCDE1234F".to_string(),
            detected_type: Some(DocumentKind::Pan),
            detected_id: Some("ABCDE1234F".to_string()),
            extracted: Some(ExtractedText {
                raw_text_snippet: "ABCDE1234F".to_string(),
            }),
            confidence: Some(0.7),
            phash: Some(Fingerprint::from_bits(7)),
            processing_ms: 12,
        };
        let json: serde_json::Value = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["accepted"], true);
        assert_eq!(json["code"], "OK");
        assert_eq!(json["detected_type"], "pan");
        assert_eq!(json["detected_id"], "ABCDE1234F");
        assert_eq!(json["extracted"]["raw_text_snippet"], "ABCDE1234F");
        assert_eq!(json["phash"], "0000000000000007");
        assert_eq!(json["processing_ms"], 12);
    }
}
