// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing: upload decoding and the plate recognition pipeline
//!
//! This module provides:
//! - image decoding for multipart/base64 uploads
//! - plate localization + OCR via two ONNX models
//! - the model manager holding both sessions for the process lifetime

pub mod image_utils;
pub mod model_manager;
pub mod plate;

pub use image_utils::{
    decode_base64_image, decode_image_bytes, sniff_format, ImageError, ImageInfo, MAX_IMAGE_BYTES,
};
pub use model_manager::{PlateModelConfig, PlateModelManager};
pub use plate::{PipelineOutcome, PlateBox, PlateError, PlatePipeline};
