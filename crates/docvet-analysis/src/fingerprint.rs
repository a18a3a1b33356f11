// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perceptual fingerprinting — a 64-bit DCT hash over a downsampled grayscale
// rendition of the image. Visually similar images yield fingerprints with
// low Hamming distance.

use std::f64::consts::PI;

use docvet_core::types::Fingerprint;
use image::imageops::FilterType;
use tracing::instrument;

use crate::decode::DecodedImage;

/// Side length of the downsampled grayscale square fed to the DCT.
const SAMPLE_SIZE: usize = 32;

/// Side length of the low-frequency block kept from the DCT output.
/// Yields a SAMPLE x SAMPLE / 16 = 64-bit hash.
const HASH_SIZE: usize = 8;

/// Compute the perceptual fingerprint of a decoded image.
///
/// Pipeline: grayscale → 32x32 Lanczos3 downsample → 2-D DCT-II → keep the
/// top-left 8x8 low-frequency block → one bit per coefficient, set when the
/// coefficient exceeds the block median. Deterministic; no failure path.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn compute_fingerprint(image: &DecodedImage) -> Fingerprint {
    let small = image
        .as_dynamic()
        .resize_exact(SAMPLE_SIZE as u32, SAMPLE_SIZE as u32, FilterType::Lanczos3)
        .to_luma8();

    let mut pixels = [[0.0f64; SAMPLE_SIZE]; SAMPLE_SIZE];
    for (x, y, pixel) in small.enumerate_pixels() {
        pixels[y as usize][x as usize] = pixel.0[0] as f64;
    }

    let freq = dct_2d(&pixels);

    let mut low_freq = [0.0f64; HASH_SIZE * HASH_SIZE];
    for row in 0..HASH_SIZE {
        for col in 0..HASH_SIZE {
            low_freq[row * HASH_SIZE + col] = freq[row][col];
        }
    }

    let threshold = median(&low_freq);
    let mut bits = 0u64;
    for (index, &coeff) in low_freq.iter().enumerate() {
        if coeff > threshold {
            bits |= 1 << (63 - index);
        }
    }

    Fingerprint::from_bits(bits)
}

/// Unnormalised DCT-II along one axis. Scale factors cancel out in the
/// median comparison, so none are applied.
fn dct_1d(input: &[f64; SAMPLE_SIZE]) -> [f64; SAMPLE_SIZE] {
    let n = SAMPLE_SIZE as f64;
    let mut output = [0.0f64; SAMPLE_SIZE];
    for (k, slot) in output.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (i, &value) in input.iter().enumerate() {
            acc += value * (PI * k as f64 * (2 * i + 1) as f64 / (2.0 * n)).cos();
        }
        *slot = acc;
    }
    output
}

/// Separable 2-D DCT: transform rows, then columns.
fn dct_2d(pixels: &[[f64; SAMPLE_SIZE]; SAMPLE_SIZE]) -> [[f64; SAMPLE_SIZE]; SAMPLE_SIZE] {
    let mut row_pass = [[0.0f64; SAMPLE_SIZE]; SAMPLE_SIZE];
    for (r, row) in pixels.iter().enumerate() {
        row_pass[r] = dct_1d(row);
    }

    let mut output = [[0.0f64; SAMPLE_SIZE]; SAMPLE_SIZE];
    for c in 0..SAMPLE_SIZE {
        let mut column = [0.0f64; SAMPLE_SIZE];
        for r in 0..SAMPLE_SIZE {
            column[r] = row_pass[r][c];
        }
        let transformed = dct_1d(&column);
        for r in 0..SAMPLE_SIZE {
            output[r][c] = transformed[r];
        }
    }
    output
}

/// Median of a coefficient block. Even-length input averages the two middle
/// values, matching the numpy convention the original service relied on.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    fn decoded(gray: GrayImage) -> DecodedImage {
        DecodedImage::from_dynamic(DynamicImage::ImageLuma8(gray))
    }

    fn gradient(offset: u8) -> GrayImage {
        GrayImage::from_fn(64, 64, |x, _| Luma([(x as u8) * 3 + offset]))
    }

    fn checkerboard() -> GrayImage {
        GrayImage::from_fn(64, 64, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    #[test]
    fn fingerprint_is_fixed_width_hex() {
        let fp = compute_fingerprint(&decoded(gradient(0)));
        assert_eq!(fp.as_str().len(), Fingerprint::HEX_WIDTH);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = compute_fingerprint(&decoded(checkerboard()));
        let b = compute_fingerprint(&decoded(checkerboard()));
        assert_eq!(a, b);
        assert_eq!(a.distance(&b), Some(0));
    }

    #[test]
    fn distinct_content_yields_distinct_fingerprints() {
        let blocks = compute_fingerprint(&decoded(checkerboard()));
        let ramp = compute_fingerprint(&decoded(gradient(0)));
        assert!(blocks.distance(&ramp).expect("valid hex") > 0);
    }

    #[test]
    fn brightness_shift_keeps_bit_distance_low() {
        // A uniform brightness change moves only the DC coefficient, so the
        // comparison against the block median flips at most a handful of
        // bits near the median.
        let base = compute_fingerprint(&decoded(gradient(0)));
        let brighter = compute_fingerprint(&decoded(gradient(10)));
        let distance = base.distance(&brighter).expect("valid hex");
        assert!(distance <= 10, "brightness shift moved {distance} bits");
    }

    #[test]
    fn median_averages_middle_pair_for_even_lengths() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
    }
}
