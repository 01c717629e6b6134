// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of uploaded vehicle photos
//!
//! Uploads arrive as raw encoded bytes (multipart) or base64 (JSON).
//! Both paths funnel into one bounded, format-sniffing decoder; every
//! failure here is the caller's input, mapped to `InvalidImage` at the
//! API boundary.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Maximum accepted upload size (10MB decoded)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Errors decoding an uploaded photo
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image data is empty")]
    EmptyData,

    #[error("image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("unrecognized image format")]
    UnsupportedFormat,

    #[error("failed to decode image: {0}")]
    DecodeFailed(String),
}

/// Decoded photo metadata, logged alongside each prediction
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Encoded size in bytes
    pub size_bytes: usize,
}

/// Decode raw encoded image bytes (multipart upload path)
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_BYTES));
    }

    let format = sniff_format(bytes)?;
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Decode a base64-encoded image (JSON upload path)
pub fn decode_base64_image(base64_str: &str) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if base64_str.is_empty() {
        return Err(ImageError::EmptyData);
    }
    let bytes = STANDARD.decode(base64_str)?;
    decode_image_bytes(&bytes)
}

/// Detect the image format from magic bytes.
///
/// The set matches what the pipeline accepts: common still rasters.
pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II*\0 or MM\0*
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 red PNG image (base64)
    const TINY_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_png_bytes() {
        let bytes = STANDARD.decode(TINY_PNG_BASE64).unwrap();
        let (img, info) = decode_image_bytes(&bytes).unwrap();
        assert_eq!((info.width, info.height), (1, 1));
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!(img.width(), 1);
        assert!(info.size_bytes > 0);
    }

    #[test]
    fn test_decode_base64_roundtrip() {
        let (_, info) = decode_base64_image(TINY_PNG_BASE64).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(
            decode_image_bytes(&[]),
            Err(ImageError::EmptyData)
        ));
        assert!(matches!(
            decode_base64_image(""),
            Err(ImageError::EmptyData)
        ));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let result = decode_base64_image("not-valid-base64!!!");
        assert!(matches!(result, Err(ImageError::InvalidBase64(_))));
    }

    #[test]
    fn test_decode_oversized_input() {
        let huge = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            decode_image_bytes(&huge),
            Err(ImageError::TooLarge(_, _))
        ));
    }

    #[test]
    fn test_decode_unrecognized_format() {
        let garbage = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05];
        assert!(matches!(
            decode_image_bytes(&garbage),
            Err(ImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_decode_truncated_png_fails() {
        // Correct magic, corrupted payload
        let corrupted = [0x89, 0x50, 0x4E, 0x47, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(
            decode_image_bytes(&corrupted),
            Err(ImageError::DecodeFailed(_))
        ));
    }

    #[test]
    fn test_sniff_jpeg() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(sniff_format(&jpeg_header).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_sniff_webp() {
        let webp_header = [
            0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50,
        ];
        assert_eq!(sniff_format(&webp_header).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_sniff_tiff_both_endians() {
        assert_eq!(
            sniff_format(&[0x49, 0x49, 0x2A, 0x00, 0x00]).unwrap(),
            ImageFormat::Tiff
        );
        assert_eq!(
            sniff_format(&[0x4D, 0x4D, 0x00, 0x2A, 0x00]).unwrap(),
            ImageFormat::Tiff
        );
    }

    #[test]
    fn test_sniff_too_short() {
        assert!(sniff_format(&[0x89, 0x50]).is_err());
    }
}
