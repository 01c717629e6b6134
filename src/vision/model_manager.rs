// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model lifecycle: load both ONNX sessions once, hold them read-only
//!
//! A model that fails to load is a fatal startup condition; the process
//! must refuse to serve until the model assets are resolved, so `new`
//! propagates the error instead of degrading to a partial service.

use std::sync::Arc;

use crate::vision::plate::{
    PlateDetectionModel, PlateError, PlatePipeline, PlateRecognitionModel,
};

/// Paths and tuning for the two plate models
#[derive(Debug, Clone)]
pub struct PlateModelConfig {
    /// Path to the plate localization ONNX model (best.onnx)
    pub detection_model_path: String,
    /// Path to the plate OCR ONNX model
    pub recognition_model_path: String,
    /// Spatial input size the localization model was exported with
    pub detection_input: u32,
    /// Minimum detection confidence; 0.0 disables the threshold
    pub min_confidence: f32,
}

impl Default for PlateModelConfig {
    fn default() -> Self {
        Self {
            detection_model_path: "./models/best.onnx".to_string(),
            recognition_model_path: "./models/european-plates-mobile-vit-v2.onnx".to_string(),
            detection_input: crate::vision::plate::DEFAULT_DETECTION_INPUT,
            min_confidence: crate::vision::plate::DEFAULT_MIN_CONFIDENCE,
        }
    }
}

/// Owner of the loaded plate models
///
/// Sessions load once at startup and are shared read-only behind `Arc`
/// for the process lifetime; every request clones the `Arc`s, never the
/// sessions.
pub struct PlateModelManager {
    detector: Arc<PlateDetectionModel>,
    reader: Arc<PlateRecognitionModel>,
}

impl std::fmt::Debug for PlateModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlateModelManager")
            .field("detector", &self.detector)
            .field("reader", &self.reader)
            .finish()
    }
}

impl PlateModelManager {
    /// Load both models from the configured paths
    ///
    /// # Errors
    /// `PlateError::ModelLoad` if either session fails; callers must
    /// treat this as fatal and not retry silently.
    pub async fn new(config: &PlateModelConfig) -> Result<Self, PlateError> {
        let detector = PlateDetectionModel::new(
            &config.detection_model_path,
            config.detection_input,
            config.min_confidence,
        )
        .await?;

        let reader = PlateRecognitionModel::new(&config.recognition_model_path).await?;

        tracing::info!("✅ Plate models loaded (detection + recognition)");

        Ok(Self {
            detector: Arc::new(detector),
            reader: Arc::new(reader),
        })
    }

    /// Build the request-facing pipeline over the shared models
    pub fn pipeline(&self) -> PlatePipeline {
        PlatePipeline::new(self.detector.clone(), self.reader.clone())
    }

    pub fn detector(&self) -> Arc<PlateDetectionModel> {
        self.detector.clone()
    }

    pub fn reader(&self) -> Arc<PlateRecognitionModel> {
        self.reader.clone()
    }
}
