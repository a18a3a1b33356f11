// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sharpness scoring — variance of the Laplacian response over a grayscale
// image. Low variance in the second derivative means weak edges, i.e. blur.

use image::Luma;
use imageproc::definitions::Image;
use imageproc::filter::filter3x3;
use tracing::instrument;

/// Four-connected 3x3 Laplacian kernel.
const LAPLACIAN_KERNEL: [f32; 9] = [
    0.0, 1.0, 0.0, //
    1.0, -4.0, 1.0, //
    0.0, 1.0, 0.0,
];

/// Compute the focus metric for a grayscale image: the population variance
/// of its Laplacian response.
///
/// Deterministic for identical pixel input. Never fails: images too small
/// for the 3x3 kernel score 0.0 and are treated as maximally blurry.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn laplacian_variance(gray: &image::GrayImage) -> f64 {
    if gray.width() < 3 || gray.height() < 3 {
        return 0.0;
    }

    let response: Image<Luma<f32>> = filter3x3::<Luma<u8>, f32, f32>(gray, &LAPLACIAN_KERNEL);

    let count = (response.width() as u64 * response.height() as u64) as f64;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for pixel in response.pixels() {
        let value = pixel.0[0] as f64;
        sum += value;
        sum_sq += value * value;
    }

    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}
