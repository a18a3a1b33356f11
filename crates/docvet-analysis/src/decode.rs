// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image decoding — turns uploaded bytes into a normalised RGB raster.

use docvet_core::error::{DocvetError, Result};
use image::{DynamicImage, GrayImage, ImageError};
use tracing::{debug, instrument};

/// A decoded document image, normalised to the RGB8 colour model.
///
/// Owned exclusively by a single pipeline invocation and never mutated after
/// construction. Unusual-but-valid colour layouts (palette, 16-bit, alpha)
/// are normalised away here rather than rejected.
#[derive(Debug)]
pub struct DecodedImage {
    image: DynamicImage,
}

impl DecodedImage {
    /// Decode raw uploaded bytes (JPEG, PNG, TIFF, etc.).
    ///
    /// # Errors
    ///
    /// Returns [`DocvetError::UnrecognizedImage`] when the bytes are not a
    /// recognisable image container, or [`DocvetError::ImageRead`] for any
    /// other decoding fault (truncated or corrupt data). Both are
    /// client-input faults; nothing else fails here.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(data).map_err(classify_decode_error)?;
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "Image decoded from bytes"
        );
        Ok(Self::from_dynamic(decoded))
    }

    /// Wrap an already-decoded image, normalising it to RGB8.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let normalised = match image {
            DynamicImage::ImageRgb8(_) => image,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
        Self { image: normalised }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Derive the single-channel grayscale view used for sharpness scoring.
    pub fn to_grayscale(&self) -> GrayImage {
        self.image.to_luma8()
    }
}

/// Split decode failures into the two client-input categories the boundary
/// distinguishes: unrecognised container vs any other read failure.
fn classify_decode_error(err: ImageError) -> DocvetError {
    match err {
        ImageError::Unsupported(inner) => DocvetError::UnrecognizedImage(inner.to_string()),
        other => DocvetError::ImageRead(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .expect("encode test image");
        buffer
    }

    #[test]
    fn decodes_valid_png() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([10, 20, 30])));
        let decoded = DecodedImage::from_bytes(&png_bytes(&img)).expect("decode");
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
    }

    #[test]
    fn normalises_alpha_to_rgb() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([5, 6, 7, 200])));
        let decoded = DecodedImage::from_bytes(&png_bytes(&img)).expect("decode");
        assert!(matches!(decoded.as_dynamic(), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn garbage_bytes_are_an_unrecognized_image() {
        let err = DecodedImage::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DocvetError::UnrecognizedImage(_)));
        assert!(err.is_client_fault());
    }

    #[test]
    fn truncated_png_is_a_client_fault() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([1, 2, 3])));
        let mut bytes = png_bytes(&img);
        bytes.truncate(bytes.len() / 2);
        let err = DecodedImage::from_bytes(&bytes).unwrap_err();
        assert!(err.is_client_fault());
    }

    #[test]
    fn grayscale_view_matches_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(7, 5, Rgb([100, 100, 100])));
        let decoded = DecodedImage::from_dynamic(img);
        let gray = decoded.to_grayscale();
        assert_eq!(gray.dimensions(), (7, 5));
    }
}
