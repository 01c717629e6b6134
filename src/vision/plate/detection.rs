// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plate localization model
//!
//! This module wraps the single-class YOLO-style ONNX model that locates
//! the license plate in a full vehicle photo. It returns at most one box:
//! the highest-confidence candidate, rescaled to original image
//! coordinates.

use image::{DynamicImage, GenericImageView};
use ndarray::ArrayViewD;
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::error::PlateError;
use super::preprocessing::image_to_detection_tensor;

/// Default spatial input size for the localization model
pub const DEFAULT_DETECTION_INPUT: u32 = 640;

/// Default minimum confidence for a detection to count.
///
/// The original pipeline had no threshold and always took the argmax box,
/// so plate-less photos still produced a (meaningless) crop. 0.0 restores
/// that behavior.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.25;

/// A detected plate region in ORIGINAL image coordinates.
///
/// Corner coordinates are kept signed: the center/size arithmetic can
/// produce values outside the image, and clamping is the cropper's job.
/// After `normalized()` the invariant x1 <= x2 and y1 <= y2 holds.
/// Rescaling truncates toward zero, matching the original integer casts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    /// Detection confidence (0.0-1.0)
    pub confidence: f32,
}

impl PlateBox {
    /// Reorder corners so that x1 <= x2 and y1 <= y2
    pub fn normalized(self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
            confidence: self.confidence,
        }
    }

    pub fn width(&self) -> i64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i64 {
        self.y2 - self.y1
    }

    /// Check that the box has positive area
    pub fn is_valid(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }
}

/// Plate localization model (YOLOv11, single class, one box per image)
///
/// The session is shared read-only behind `Arc` and serialized behind a
/// `Mutex`: concurrent inference against one session is not assumed safe.
#[derive(Clone)]
pub struct PlateDetectionModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Model input height in pixels
    input_height: u32,
    /// Model input width in pixels
    input_width: u32,
    /// Candidates below this confidence yield no detection
    min_confidence: f32,
}

impl std::fmt::Debug for PlateDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlateDetectionModel")
            .field("input_name", &self.input_name)
            .field("input_height", &self.input_height)
            .field("input_width", &self.input_width)
            .field("min_confidence", &self.min_confidence)
            .finish_non_exhaustive()
    }
}

impl PlateDetectionModel {
    /// Load the plate localization model from a file
    ///
    /// # Arguments
    /// - `model_path`: Path to the ONNX model file (best.onnx)
    /// - `input_size`: Spatial input size the model was exported with
    /// - `min_confidence`: Threshold below which the best candidate is
    ///   discarded
    ///
    /// # Errors
    /// Returns `PlateError::ModelLoad` if the file is missing or the ONNX
    /// Runtime fails to initialize. Callers must treat this as fatal.
    pub async fn new<P: AsRef<Path>>(
        model_path: P,
        input_size: u32,
        min_confidence: f32,
    ) -> Result<Self, PlateError> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            return Err(PlateError::ModelLoad(format!(
                "plate detection model not found: {}",
                model_path.display()
            )));
        }

        info!(
            "Loading plate detection model from {}",
            model_path.display()
        );

        // CUDA first, CPU fallback: prefer the faster backend if available
        let session = Session::builder()
            .and_then(|b| {
                b.with_execution_providers([
                    CUDAExecutionProvider::default().build(),
                    CPUExecutionProvider::default().build(),
                ])
            })
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(4))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| {
                PlateError::ModelLoad(format!(
                    "failed to load plate detection model from {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        // The model dictates its input dims exactly; the configured size
        // must match what the model was exported with
        let (input_height, input_width) = (input_size, input_size);

        debug!(
            "Detection model loaded - input: {}, expects {}x{}",
            input_name, input_height, input_width
        );

        info!("✅ Plate detection model loaded successfully");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_height,
            input_width,
            min_confidence: min_confidence.clamp(0.0, 1.0),
        })
    }

    /// Model input size as (height, width)
    pub fn input_size(&self) -> (u32, u32) {
        (self.input_height, self.input_width)
    }

    /// Current minimum-confidence threshold
    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Locate the plate in a full vehicle photo
    ///
    /// Runs one forward pass and keeps the single highest-confidence
    /// candidate, rescaled back to the original image's coordinate space.
    ///
    /// # Returns
    /// - `Ok(Some(PlateBox))`: best candidate at or above the threshold
    /// - `Ok(None)`: no candidates, or best candidate below the threshold
    /// - `Err(PlateError::InferenceRuntime)`: execution failed or the
    ///   output tensor is not the expected (1, 5, K) layout
    pub fn detect(&self, image: &DynamicImage) -> Result<Option<PlateBox>, PlateError> {
        let (orig_w, orig_h) = image.dimensions();

        let input = image_to_detection_tensor(image, self.input_width, self.input_height);

        let mut session = self.session.lock().unwrap();

        let input_value = Value::from_array(input).map_err(|e| PlateError::InferenceRuntime {
            stage: "detection",
            detail: format!("failed to create input tensor: {}", e),
        })?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| PlateError::InferenceRuntime {
                stage: "detection",
                detail: format!("forward pass failed: {}", e),
            })?;

        let output_tensor =
            outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| PlateError::InferenceRuntime {
                    stage: "detection",
                    detail: format!("failed to extract output tensor: {}", e),
                })?;

        let best = select_best_candidate(output_tensor.view(), self.min_confidence)?;

        Ok(best.map(|(cx, cy, w, h, confidence)| {
            let bbox = rescale_to_original(
                cx,
                cy,
                w,
                h,
                confidence,
                (self.input_width, self.input_height),
                (orig_w, orig_h),
            );
            debug!(
                "Detected plate {:?} (confidence {:.3})",
                (bbox.x1, bbox.y1, bbox.x2, bbox.y2),
                confidence
            );
            bbox
        }))
    }
}

/// Pick the highest-confidence candidate from the raw model output.
///
/// Expected layout is (1, 5, K): rows 0-3 carry (center-x, center-y,
/// width, height) in resized coordinates, row 4 the confidence per
/// candidate. Ties resolve to the first occurrence, an explicit policy
/// rather than an accident of iteration order.
///
/// Returns `Ok(None)` when K = 0 or the best score is below `threshold`.
pub(crate) fn select_best_candidate(
    output: ArrayViewD<'_, f32>,
    threshold: f32,
) -> Result<Option<(f32, f32, f32, f32, f32)>, PlateError> {
    let shape = output.shape();

    if shape.len() != 3 || shape[0] != 1 || shape[1] != 5 {
        return Err(PlateError::InferenceRuntime {
            stage: "detection",
            detail: format!("unexpected output shape {:?}, expected (1, 5, K)", shape),
        });
    }

    let candidates = shape[2];
    if candidates == 0 {
        return Ok(None);
    }

    let mut best_index = 0usize;
    let mut best_conf = f32::NEG_INFINITY;
    for k in 0..candidates {
        let conf = output[[0, 4, k]];
        // Strict '>' keeps the first occurrence on ties
        if conf > best_conf {
            best_conf = conf;
            best_index = k;
        }
    }

    if best_conf < threshold {
        debug!(
            "Best candidate confidence {:.3} below threshold {:.3}",
            best_conf, threshold
        );
        return Ok(None);
    }

    Ok(Some((
        output[[0, 0, best_index]],
        output[[0, 1, best_index]],
        output[[0, 2, best_index]],
        output[[0, 3, best_index]],
        best_conf,
    )))
}

/// Rescale a center/size candidate from resized space into original image
/// space and convert it to corner form.
///
/// Each axis scales independently: `original = resized / resized_dim *
/// original_dim`. Values truncate toward zero (floor for non-negative
/// input), matching the original integer casts, and corners are
/// normalized so x1 <= x2, y1 <= y2.
pub(crate) fn rescale_to_original(
    cx: f32,
    cy: f32,
    w: f32,
    h: f32,
    confidence: f32,
    input_size: (u32, u32),
    original_size: (u32, u32),
) -> PlateBox {
    let (input_w, input_h) = input_size;
    let (orig_w, orig_h) = original_size;

    let cx = (cx / input_w as f32 * orig_w as f32) as i64;
    let cy = (cy / input_h as f32 * orig_h as f32) as i64;
    let w = (w / input_w as f32 * orig_w as f32) as i64;
    let h = (h / input_h as f32 * orig_h as f32) as i64;

    let x1 = cx - w / 2;
    let y1 = cy - h / 2;

    PlateBox {
        x1,
        y1,
        x2: x1 + w,
        y2: y1 + h,
        confidence,
    }
    .normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn output_with_candidates(candidates: &[(f32, f32, f32, f32, f32)]) -> Array3<f32> {
        let k = candidates.len();
        let mut out = Array3::<f32>::zeros((1, 5, k));
        for (i, &(cx, cy, w, h, conf)) in candidates.iter().enumerate() {
            out[[0, 0, i]] = cx;
            out[[0, 1, i]] = cy;
            out[[0, 2, i]] = w;
            out[[0, 3, i]] = h;
            out[[0, 4, i]] = conf;
        }
        out
    }

    #[test]
    fn test_select_best_picks_maximum() {
        let out = output_with_candidates(&[
            (10.0, 10.0, 4.0, 4.0, 0.3),
            (50.0, 60.0, 20.0, 10.0, 0.9),
            (30.0, 30.0, 8.0, 8.0, 0.5),
        ]);
        let best = select_best_candidate(out.view().into_dyn(), 0.0)
            .unwrap()
            .unwrap();
        assert_eq!(best, (50.0, 60.0, 20.0, 10.0, 0.9));
    }

    #[test]
    fn test_select_best_tie_resolves_to_first() {
        let out = output_with_candidates(&[
            (1.0, 1.0, 2.0, 2.0, 0.7),
            (9.0, 9.0, 2.0, 2.0, 0.7),
        ]);
        let best = select_best_candidate(out.view().into_dyn(), 0.0)
            .unwrap()
            .unwrap();
        // First occurrence wins
        assert_eq!(best.0, 1.0);
    }

    #[test]
    fn test_select_best_empty_candidates() {
        let out = Array3::<f32>::zeros((1, 5, 0));
        let best = select_best_candidate(out.view().into_dyn(), 0.0).unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn test_select_best_below_threshold() {
        let out = output_with_candidates(&[(10.0, 10.0, 4.0, 4.0, 0.2)]);
        let best = select_best_candidate(out.view().into_dyn(), 0.25).unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn test_select_best_malformed_shape() {
        let out = ndarray::Array2::<f32>::zeros((5, 10));
        let result = select_best_candidate(out.view().into_dyn(), 0.0);
        assert!(matches!(
            result,
            Err(PlateError::InferenceRuntime { stage: "detection", .. })
        ));
    }

    #[test]
    fn test_select_best_wrong_row_count() {
        let out = Array3::<f32>::zeros((1, 6, 10));
        assert!(select_best_candidate(out.view().into_dyn(), 0.0).is_err());
    }

    #[test]
    fn test_rescale_identity_when_sizes_match() {
        let bbox = rescale_to_original(100.0, 80.0, 40.0, 20.0, 0.9, (640, 640), (640, 640));
        assert_eq!(bbox.x1, 80);
        assert_eq!(bbox.y1, 70);
        assert_eq!(bbox.x2, 120);
        assert_eq!(bbox.y2, 90);
    }

    #[test]
    fn test_rescale_scales_axes_independently() {
        // 640x640 model space onto a 1280x320 original: x doubles, y halves
        let bbox = rescale_to_original(320.0, 320.0, 100.0, 100.0, 0.8, (640, 640), (1280, 320));
        assert_eq!(bbox.x2 - bbox.x1, 200);
        assert_eq!(bbox.y2 - bbox.y1, 50);
        assert_eq!((bbox.x1 + bbox.x2) / 2, 640);
    }

    #[test]
    fn test_rescale_roundtrip_within_one_pixel() {
        // A synthetic box placed in resized space must land at the same
        // relative position in the original, within integer truncation
        let (orig_w, orig_h) = (1920u32, 1080u32);
        let (in_w, in_h) = (640u32, 640u32);
        let (cx, cy, w, h) = (320.0f32, 160.0f32, 64.0f32, 32.0f32);

        let bbox = rescale_to_original(cx, cy, w, h, 0.9, (in_w, in_h), (orig_w, orig_h));

        let expected_cx = cx / in_w as f32 * orig_w as f32;
        let expected_cy = cy / in_h as f32 * orig_h as f32;
        let got_cx = (bbox.x1 + bbox.x2) as f32 / 2.0;
        let got_cy = (bbox.y1 + bbox.y2) as f32 / 2.0;

        assert!((got_cx - expected_cx).abs() <= 1.0);
        assert!((got_cy - expected_cy).abs() <= 1.0);
    }

    #[test]
    fn test_plate_box_normalized() {
        let bbox = PlateBox {
            x1: 50,
            y1: 40,
            x2: 10,
            y2: 20,
            confidence: 0.5,
        }
        .normalized();
        assert!(bbox.x1 <= bbox.x2);
        assert!(bbox.y1 <= bbox.y2);
        assert_eq!(bbox.x1, 10);
        assert_eq!(bbox.y2, 40);
    }

    #[test]
    fn test_plate_box_validity() {
        let degenerate = PlateBox {
            x1: 10,
            y1: 10,
            x2: 10,
            y2: 30,
            confidence: 0.9,
        };
        assert!(!degenerate.is_valid());

        let ok = PlateBox {
            x1: 0,
            y1: 0,
            x2: 5,
            y2: 5,
            confidence: 0.9,
        };
        assert!(ok.is_valid());
    }

    #[tokio::test]
    async fn test_model_not_found_error() {
        let result = PlateDetectionModel::new(
            "/nonexistent/best.onnx",
            DEFAULT_DETECTION_INPUT,
            DEFAULT_MIN_CONFIDENCE,
        )
        .await;
        assert!(matches!(result, Err(PlateError::ModelLoad(_))));
    }
}
