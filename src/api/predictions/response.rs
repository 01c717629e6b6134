// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction response types

use serde::{Deserialize, Serialize};

use crate::db::PredictionRecord;

/// Response for POST /v1/predictions
///
/// A plate-less photo is a legitimate negative outcome, reported as
/// `detected: false` with 200; not an error, and nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Whether a plate was found
    pub detected: bool,
    /// Recognized plate text (present when detected)
    pub result: Option<String>,
    /// Detector confidence for the selected box
    pub detection_confidence: Option<f32>,
    /// Recognizer confidence for the text
    pub ocr_confidence: Option<f32>,
    /// The persisted record (present when detected)
    pub prediction: Option<PredictionRecord>,
}

impl PredictResponse {
    pub fn detected(
        record: PredictionRecord,
        detection_confidence: f32,
        ocr_confidence: f32,
    ) -> Self {
        Self {
            detected: true,
            result: Some(record.result.clone()),
            detection_confidence: Some(detection_confidence),
            ocr_confidence: Some(ocr_confidence),
            prediction: Some(record),
        }
    }

    pub fn not_detected() -> Self {
        Self {
            detected: false,
            result: None,
            detection_confidence: None,
            ocr_confidence: None,
            prediction: None,
        }
    }
}
