// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error taxonomy for the plate recognition pipeline

use thiserror::Error;

/// Errors produced by the detection/crop/recognition pipeline.
///
/// `EmptyCrop` is not surfaced to callers of the full pipeline: the
/// coordinator folds it into a `NoDetection` outcome, since a degenerate
/// box means the detector found nothing usable.
#[derive(Debug, Error)]
pub enum PlateError {
    /// Input bytes could not be decoded into an image (user error)
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// A model file could not be loaded. Fatal at startup: the process
    /// must refuse to serve until resolved, never retry silently.
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// The detected box has zero or negative area after clamping
    #[error("detected box has no area after clamping to image bounds")]
    EmptyCrop,

    /// A plate region was found but the recognizer produced no text
    #[error("no text recognized in plate region")]
    NoTextRecognized,

    /// The underlying model execution failed or returned malformed output
    #[error("inference failure in {stage}: {detail}")]
    InferenceRuntime {
        /// Pipeline stage that failed ("detection" or "recognition")
        stage: &'static str,
        detail: String,
    },
}

impl PlateError {
    /// True for failures caused by the caller's input rather than the node
    pub fn is_user_error(&self) -> bool {
        matches!(self, PlateError::InvalidImage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_classification() {
        assert!(PlateError::InvalidImage("bad bytes".into()).is_user_error());
        assert!(!PlateError::EmptyCrop.is_user_error());
        assert!(!PlateError::NoTextRecognized.is_user_error());
        assert!(!PlateError::InferenceRuntime {
            stage: "detection",
            detail: "shape".into()
        }
        .is_user_error());
    }

    #[test]
    fn test_display_includes_stage() {
        let err = PlateError::InferenceRuntime {
            stage: "recognition",
            detail: "unexpected output rank".into(),
        };
        assert!(err.to_string().contains("recognition"));
    }
}
