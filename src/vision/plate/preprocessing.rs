// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image-to-tensor conversion for the plate localization model

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

/// Preprocess a full photo for plate detection
///
/// Steps:
/// 1. Resize to the model's exact (width, height); aspect ratio is NOT
///    preserved, the model dictates input dimensions
/// 2. Convert to RGB
/// 3. Normalize pixel values to [0.0, 1.0]
/// 4. Rearrange HWC -> CHW and add a batch dimension: [1, 3, H, W]
///
/// The input image is never mutated; resizing produces a new raster.
pub fn image_to_detection_tensor(image: &DynamicImage, width: u32, height: u32) -> Array4<f32> {
    let resized = image.resize_exact(width, height, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}
