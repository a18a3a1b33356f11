// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Identifier extraction — ordered pattern matchers over recognised text.
//
// The matchers run in a fixed priority order and the first match wins:
// PAN, then Aadhaar, then passport, then the text-density fallback. PAN is
// checked first as the most structurally specific shape (letter-digit-letter
// triad); the ordering is policy and changing it changes classification
// outcomes on ambiguous inputs.

use std::sync::LazyLock;

use docvet_core::types::DocumentKind;
use regex::Regex;
use tracing::{debug, instrument};

/// PAN card number: 5 uppercase letters, 4 digits, 1 uppercase letter.
/// Matched against upper-cased text with spaces removed; newlines survive
/// the stripping and keep serving as token boundaries.
static PAN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{5}[0-9]{4}[A-Z])\b").unwrap());

/// Aadhaar-style national ID: three 4-digit groups, optionally separated by
/// whitespace. Matched against the raw text, no normalisation beforehand.
static NATIONAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}\s?\d{4}\s?\d{4})").unwrap());

/// Passport number: 1 letter followed by 7 digits, case-insensitive.
/// Matched against text with spaces removed.
static PASSPORT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([A-Z]\d{7})\b").unwrap());

/// Minimum trimmed character count for the generic-document fallback.
const DOCUMENT_TEXT_THRESHOLD: usize = 100;

/// Outcome of running the matchers over one piece of recognised text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: DocumentKind,
    /// The extracted identifier, tied to the matched kind. Absent for
    /// `Document` and `Unknown`.
    pub identifier: Option<String>,
}

/// Extract a PAN number from recognised text.
pub fn parse_pan(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let condensed = strip_spaces(text).to_uppercase();
    PAN_ID
        .captures(&condensed)
        .map(|caps| caps[1].to_string())
}

/// Extract an Aadhaar-style national ID from recognised text. The returned
/// identifier has the group separators removed.
pub fn parse_aadhaar(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    NATIONAL_ID
        .captures(text)
        .map(|caps| caps[1].split_whitespace().collect())
}

/// Extract a passport number from recognised text, upper-cased.
pub fn parse_passport(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let condensed = strip_spaces(text);
    PASSPORT_ID
        .captures(&condensed)
        .map(|caps| caps[1].to_uppercase())
}

/// Classify recognised text by running the matchers in priority order.
#[instrument(skip(text), fields(text_len = text.len()))]
pub fn classify(text: &str) -> Classification {
    if let Some(id) = parse_pan(text) {
        debug!(id = %id, "PAN pattern matched");
        return Classification {
            kind: DocumentKind::Pan,
            identifier: Some(id),
        };
    }
    if let Some(id) = parse_aadhaar(text) {
        debug!(id = %id, "national ID pattern matched");
        return Classification {
            kind: DocumentKind::Aadhaar,
            identifier: Some(id),
        };
    }
    if let Some(id) = parse_passport(text) {
        debug!(id = %id, "passport pattern matched");
        return Classification {
            kind: DocumentKind::Passport,
            identifier: Some(id),
        };
    }
    if text.trim().chars().count() > DOCUMENT_TEXT_THRESHOLD {
        debug!("no identifier matched; text-dense page classified as generic document");
        return Classification {
            kind: DocumentKind::Document,
            identifier: None,
        };
    }

    Classification {
        kind: DocumentKind::Unknown,
        identifier: None,
    }
}

/// Remove spaces only. Newlines and tabs are kept so that line breaks in
/// OCR output still separate tokens for the `\b` anchors above.
fn strip_spaces(text: &str) -> String {
    text.replace(' ', "")
}
