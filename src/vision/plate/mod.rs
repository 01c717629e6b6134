// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! License plate recognition pipeline
//!
//! Two ONNX models glued by a deterministic in-memory hand-off:
//! - `detection` - plate localization (YOLOv11, single class, best box)
//! - `crop` - region extraction in original coordinates
//! - `recognition` - fixed-slot plate OCR over the detected region
//! - `pipeline` - the coordinator sequencing the three stages

pub mod crop;
pub mod detection;
pub mod error;
pub mod pipeline;
pub mod preprocessing;
pub mod recognition;

pub use crop::crop_plate;
pub use detection::{PlateBox, PlateDetectionModel, DEFAULT_DETECTION_INPUT, DEFAULT_MIN_CONFIDENCE};
pub use error::PlateError;
pub use pipeline::{PipelineOutcome, PlateDetector, PlatePipeline, PlateReader};
pub use recognition::{PlateRecognitionModel, RecognizedPlate, PLATE_ALPHABET};
