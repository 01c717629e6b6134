// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plate text recognition model
//!
//! Wraps the fixed-slot OCR ONNX model that reads the alphanumeric text
//! off a cropped plate image. The model owns its preprocessing contract:
//! it expects a grayscale, channels-last u8 tensor of exactly
//! `REC_INPUT_HEIGHT` x `REC_INPUT_WIDTH`, and emits one probability
//! distribution over the plate alphabet per character slot. Callers treat
//! this module as an opaque `recognize_text(image) -> text` capability and
//! hand it a plate-shaped crop.

use image::{imageops::FilterType, DynamicImage};
use ndarray::{Array4, ArrayViewD};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::error::PlateError;

/// Recognition model input height in pixels
pub const REC_INPUT_HEIGHT: u32 = 70;

/// Recognition model input width in pixels
pub const REC_INPUT_WIDTH: u32 = 140;

/// Character classes emitted by the model, one probability per slot.
/// `_` is the pad symbol for unused slots and is stripped during decode.
pub const PLATE_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_";

/// Pad symbol marking an unused character slot
pub const PAD_SYMBOL: char = '_';

/// Text read off a plate, with the recognizer's confidence
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedPlate {
    /// The recognized plate text (pad symbols stripped)
    pub text: String,
    /// Mean winning-slot probability (0.0-1.0)
    pub confidence: f32,
}

/// Plate OCR model (fixed character slots over the plate alphabet)
#[derive(Clone)]
pub struct PlateRecognitionModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Decoded character classes
    alphabet: Arc<Vec<char>>,
}

impl std::fmt::Debug for PlateRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlateRecognitionModel")
            .field("input_name", &self.input_name)
            .field("alphabet_size", &self.alphabet.len())
            .finish_non_exhaustive()
    }
}

impl PlateRecognitionModel {
    /// Load the plate recognition model from a file
    ///
    /// # Errors
    /// Returns `PlateError::ModelLoad` if the file is missing or the ONNX
    /// Runtime fails to initialize. Fatal at startup.
    pub async fn new<P: AsRef<Path>>(model_path: P) -> Result<Self, PlateError> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            return Err(PlateError::ModelLoad(format!(
                "plate recognition model not found: {}",
                model_path.display()
            )));
        }

        info!(
            "Loading plate recognition model from {}",
            model_path.display()
        );

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
                    "failed to load plate recognition model from {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "input".to_string());

        debug!("Recognition model loaded - input: {}", input_name);
        info!("✅ Plate recognition model loaded successfully");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            alphabet: Arc::new(PLATE_ALPHABET.chars().collect()),
        })
    }

    /// Read the text off a cropped plate image
    ///
    /// The crop arrives in whatever channel order the source image had;
    /// grayscale conversion and the exact-size resize happen here, inside
    /// the model's own preprocessing pipeline.
    ///
    /// # Errors
    /// - `PlateError::NoTextRecognized`: every slot decoded to pad
    /// - `PlateError::InferenceRuntime`: execution failed or the output
    ///   layout does not match the alphabet
    pub fn recognize_text(&self, plate: &DynamicImage) -> Result<RecognizedPlate, PlateError> {
        let input = plate_to_recognition_tensor(plate);

        let mut session = self.session.lock().unwrap();

        let input_value = Value::from_array(input).map_err(|e| PlateError::InferenceRuntime {
            stage: "recognition",
            detail: format!("failed to create input tensor: {}", e),
        })?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| PlateError::InferenceRuntime {
                stage: "recognition",
                detail: format!("forward pass failed: {}", e),
            })?;

        let output_tensor =
            outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| PlateError::InferenceRuntime {
                    stage: "recognition",
                    detail: format!("failed to extract output tensor: {}", e),
                })?;

        let result = decode_plate_slots(output_tensor.view(), &self.alphabet)?;
        debug!(
            "Recognized plate '{}' (confidence {:.3})",
            result.text, result.confidence
        );

        Ok(result)
    }
}

/// Convert a plate crop into the model's input tensor
///
/// Grayscale, exact resize to the fixed model dims, channels-last u8:
/// [1, H, W, 1]. The crop itself is not mutated.
pub(crate) fn plate_to_recognition_tensor(plate: &DynamicImage) -> Array4<u8> {
    let gray = plate
        .resize_exact(REC_INPUT_WIDTH, REC_INPUT_HEIGHT, FilterType::Triangle)
        .to_luma8();

    let mut tensor = Array4::zeros((1, REC_INPUT_HEIGHT as usize, REC_INPUT_WIDTH as usize, 1));
    for (x, y, pixel) in gray.enumerate_pixels() {
        tensor[[0, y as usize, x as usize, 0]] = pixel[0];
    }

    tensor
}

/// Decode the model's per-slot probability output into plate text.
///
/// Expected layout is (1, slots, classes), or (slots, classes) from
/// models that squeeze the batch dim, where `classes` matches the
/// alphabet. Each slot takes its argmax character; pad symbols are
/// stripped; confidence is the mean winning probability across slots.
pub(crate) fn decode_plate_slots(
    output: ArrayViewD<'_, f32>,
    alphabet: &[char],
) -> Result<RecognizedPlate, PlateError> {
    let shape = output.shape();

    let (slots, classes, batched) = match shape.len() {
        3 if shape[0] == 1 => (shape[1], shape[2], true),
        2 => (shape[0], shape[1], false),
        _ => {
            return Err(PlateError::InferenceRuntime {
                stage: "recognition",
                detail: format!(
                    "unexpected output shape {:?}, expected (1, slots, classes)",
                    shape
                ),
            })
        }
    };

    if classes != alphabet.len() {
        return Err(PlateError::InferenceRuntime {
            stage: "recognition",
            detail: format!(
                "output has {} classes but the alphabet has {}",
                classes,
                alphabet.len()
            ),
        });
    }

    let mut text = String::new();
    let mut prob_sum = 0.0f32;

    for s in 0..slots {
        let mut max_prob = f32::NEG_INFINITY;
        let mut max_index = 0usize;
        for c in 0..classes {
            let prob = if batched {
                output[[0, s, c]]
            } else {
                output[[s, c]]
            };
            if prob > max_prob {
                max_prob = prob;
                max_index = c;
            }
        }

        prob_sum += max_prob;
        let ch = alphabet[max_index];
        if ch != PAD_SYMBOL {
            text.push(ch);
        }
    }

    if text.is_empty() {
        return Err(PlateError::NoTextRecognized);
    }

    Ok(RecognizedPlate {
        text,
        confidence: (prob_sum / slots as f32).clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn alphabet() -> Vec<char> {
        PLATE_ALPHABET.chars().collect()
    }

    fn class_of(ch: char) -> usize {
        PLATE_ALPHABET.chars().position(|c| c == ch).unwrap()
    }

    fn output_for(text: &str, slots: usize, prob: f32) -> Array3<f32> {
        let classes = PLATE_ALPHABET.chars().count();
        let mut out = Array3::<f32>::zeros((1, slots, classes));
        for s in 0..slots {
            let ch = text.chars().nth(s).unwrap_or(PAD_SYMBOL);
            out[[0, s, class_of(ch)]] = prob;
        }
        out
    }

    #[test]
    fn test_decode_simple_plate() {
        let out = output_for("AB123CD", 9, 0.95);
        let result = decode_plate_slots(out.view().into_dyn(), &alphabet()).unwrap();
        assert_eq!(result.text, "AB123CD");
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn test_decode_strips_pad_symbols() {
        let out = output_for("XY99", 9, 0.9);
        let result = decode_plate_slots(out.view().into_dyn(), &alphabet()).unwrap();
        assert_eq!(result.text, "XY99");
    }

    #[test]
    fn test_decode_preserves_repeated_characters() {
        // Fixed-slot decoding has no CTC collapse: AA11 stays AA11
        let out = output_for("AA11", 9, 0.9);
        let result = decode_plate_slots(out.view().into_dyn(), &alphabet()).unwrap();
        assert_eq!(result.text, "AA11");
    }

    #[test]
    fn test_decode_all_pads_is_no_text() {
        let out = output_for("", 9, 0.9);
        let result = decode_plate_slots(out.view().into_dyn(), &alphabet());
        assert!(matches!(result, Err(PlateError::NoTextRecognized)));
    }

    #[test]
    fn test_decode_rejects_alphabet_mismatch() {
        let out = Array3::<f32>::zeros((1, 9, 12));
        let result = decode_plate_slots(out.view().into_dyn(), &alphabet());
        assert!(matches!(
            result,
            Err(PlateError::InferenceRuntime { stage: "recognition", .. })
        ));
    }

    #[test]
    fn test_decode_rejects_bad_rank() {
        let out = ndarray::Array1::<f32>::zeros(37);
        let result = decode_plate_slots(out.view().into_dyn(), &alphabet());
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_confidence_is_mean_of_winning_probs() {
        let classes = PLATE_ALPHABET.chars().count();
        let mut out = Array3::<f32>::zeros((1, 2, classes));
        out[[0, 0, class_of('A')]] = 1.0;
        out[[0, 1, class_of('7')]] = 0.5;
        let result = decode_plate_slots(out.view().into_dyn(), &alphabet()).unwrap();
        assert_eq!(result.text, "A7");
        assert!((result.confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_recognition_tensor_layout() {
        let img = DynamicImage::new_rgb8(300, 100);
        let tensor = plate_to_recognition_tensor(&img);
        assert_eq!(
            tensor.shape(),
            &[1, REC_INPUT_HEIGHT as usize, REC_INPUT_WIDTH as usize, 1]
        );
    }

    #[test]
    fn test_alphabet_has_pad() {
        assert!(PLATE_ALPHABET.contains(PAD_SYMBOL));
        assert_eq!(PLATE_ALPHABET.chars().count(), 37);
    }

    #[tokio::test]
    async fn test_model_not_found_error() {
        let result = PlateRecognitionModel::new("/nonexistent/ocr.onnx").await;
        assert!(matches!(result, Err(PlateError::ModelLoad(_))));
    }
}
