// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plate region extraction
//!
//! Cuts the detected box out of the ORIGINAL image. Coordinates arrive in
//! original (unscaled) space and may overhang the image; they are clamped
//! here. Channel order is preserved; no recoloring at this stage.

use image::{DynamicImage, GenericImageView};

use super::detection::PlateBox;
use super::error::PlateError;

/// Extract the pixel region described by `bbox` from `image`
///
/// Box coordinates are clamped to the image bounds first. A box that is
/// empty after clamping (fully outside the image, or zero/negative area)
/// fails with `EmptyCrop`: the detector produced nothing usable, which
/// the pipeline treats as "no detection" rather than a crash.
///
/// The input image is not mutated; the crop is a new owned raster.
pub fn crop_plate(image: &DynamicImage, bbox: &PlateBox) -> Result<DynamicImage, PlateError> {
    let (width, height) = image.dimensions();
    let bbox = bbox.normalized();

    let x1 = bbox.x1.max(0);
    let y1 = bbox.y1.max(0);
    let x2 = bbox.x2.min(width as i64);
    let y2 = bbox.y2.min(height as i64);

    if x2 <= x1 || y2 <= y1 {
        return Err(PlateError::EmptyCrop);
    }

    Ok(image.crop_imm(x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: i64, y1: i64, x2: i64, y2: i64) -> PlateBox {
        PlateBox {
            x1,
            y1,
            x2,
            y2,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_crop_inside_bounds() {
        let img = DynamicImage::new_rgb8(100, 80);
        let crop = crop_plate(&img, &bbox(10, 20, 50, 60)).unwrap();
        assert_eq!(crop.dimensions(), (40, 40));
    }

    #[test]
    fn test_crop_partially_outside_clamps() {
        let img = DynamicImage::new_rgb8(100, 80);
        // Overhangs left and top; clamped region is 30x25
        let crop = crop_plate(&img, &bbox(-10, -5, 30, 25)).unwrap();
        assert_eq!(crop.dimensions(), (30, 25));
    }

    #[test]
    fn test_crop_overhanging_right_bottom() {
        let img = DynamicImage::new_rgb8(100, 80);
        let crop = crop_plate(&img, &bbox(90, 70, 200, 200)).unwrap();
        assert_eq!(crop.dimensions(), (10, 10));
    }

    #[test]
    fn test_crop_fully_outside_is_empty() {
        let img = DynamicImage::new_rgb8(100, 80);
        let result = crop_plate(&img, &bbox(150, 90, 200, 120));
        assert!(matches!(result, Err(PlateError::EmptyCrop)));
    }

    #[test]
    fn test_crop_negative_area_is_empty() {
        let img = DynamicImage::new_rgb8(100, 80);
        // Degenerate zero-width box
        let result = crop_plate(&img, &bbox(40, 10, 40, 30));
        assert!(matches!(result, Err(PlateError::EmptyCrop)));
    }

    #[test]
    fn test_crop_unordered_corners_are_normalized() {
        let img = DynamicImage::new_rgb8(100, 80);
        let crop = crop_plate(&img, &bbox(50, 60, 10, 20)).unwrap();
        assert_eq!(crop.dimensions(), (40, 40));
    }

    #[test]
    fn test_crop_does_not_mutate_input() {
        let img = DynamicImage::new_rgb8(100, 80);
        let _ = crop_plate(&img, &bbox(10, 10, 20, 20)).unwrap();
        assert_eq!(img.dimensions(), (100, 80));
    }
}
