// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pipeline coordinator: detect -> crop -> recognize
//!
//! Single pass, no retries, terminal at the first success or failure.
//! All hand-offs between stages are in-memory `DynamicImage` values;
//! nothing here touches the filesystem or any shared storage.

use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, info};

use super::crop::crop_plate;
use super::detection::{PlateBox, PlateDetectionModel};
use super::error::PlateError;
use super::recognition::{PlateRecognitionModel, RecognizedPlate};

/// Plate localization capability, stubbable in tests
pub trait PlateDetector: Send + Sync {
    /// Locate the single best plate candidate, if any
    fn detect(&self, image: &DynamicImage) -> Result<Option<PlateBox>, PlateError>;
}

/// Plate reading capability, stubbable in tests
pub trait PlateReader: Send + Sync {
    /// Read the text off a plate-shaped crop
    fn recognize_text(&self, plate: &DynamicImage) -> Result<RecognizedPlate, PlateError>;
}

impl PlateDetector for PlateDetectionModel {
    fn detect(&self, image: &DynamicImage) -> Result<Option<PlateBox>, PlateError> {
        PlateDetectionModel::detect(self, image)
    }
}

impl PlateReader for PlateRecognitionModel {
    fn recognize_text(&self, plate: &DynamicImage) -> Result<RecognizedPlate, PlateError> {
        PlateRecognitionModel::recognize_text(self, plate)
    }
}

/// Terminal result of one pipeline pass.
///
/// `NoDetection` is a legitimate negative outcome, not an error: either
/// no candidate cleared the threshold, or the winning box had no area
/// after clamping.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Success {
        /// Recognized plate text
        text: String,
        /// Detector confidence for the selected box
        detection_confidence: f32,
        /// Recognizer confidence for the text
        ocr_confidence: f32,
    },
    NoDetection,
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }
}

/// Sequences the three stages over shared read-only models.
///
/// Each `run` call is an independent, reentrant computation: the pipeline
/// holds no per-request state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct PlatePipeline {
    detector: Arc<dyn PlateDetector>,
    reader: Arc<dyn PlateReader>,
}

impl std::fmt::Debug for PlatePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatePipeline").finish_non_exhaustive()
    }
}

impl PlatePipeline {
    pub fn new(detector: Arc<dyn PlateDetector>, reader: Arc<dyn PlateReader>) -> Self {
        Self { detector, reader }
    }

    /// Run one full pass over a decoded vehicle photo
    ///
    /// Stage transitions:
    /// - no box found -> `NoDetection`
    /// - box found but empty after clamping -> `NoDetection`
    /// - recognizer failure -> the typed error, never a panic
    ///
    /// Deterministic by construction: identical input pixels and identical
    /// model weights yield the identical outcome.
    pub fn run(&self, image: &DynamicImage) -> Result<PipelineOutcome, PlateError> {
        let Some(bbox) = self.detector.detect(image)? else {
            debug!("No plate detected");
            return Ok(PipelineOutcome::NoDetection);
        };

        let plate = match crop_plate(image, &bbox) {
            Ok(plate) => plate,
            Err(PlateError::EmptyCrop) => {
                // A zero-area box is "no usable detection", not a failure
                debug!("Detected box {:?} clamped to empty region", bbox);
                return Ok(PipelineOutcome::NoDetection);
            }
            Err(e) => return Err(e),
        };

        let recognized = self.reader.recognize_text(&plate)?;

        info!(
            "Plate read: '{}' (det {:.3}, ocr {:.3})",
            recognized.text, bbox.confidence, recognized.confidence
        );

        Ok(PipelineOutcome::Success {
            text: recognized.text,
            detection_confidence: bbox.confidence,
            ocr_confidence: recognized.confidence,
        })
    }
}
