// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::MAX_IMAGE_BYTES;

/// Request for POST /v1/predictions/inline (JSON upload path)
///
/// The multipart endpoint carries the same payload as a file field; this
/// variant embeds it as base64 for clients that prefer plain JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlinePredictRequest {
    /// Base64-encoded image data
    #[serde(default)]
    pub image: Option<String>,

    /// Label stored with the prediction (original filename)
    #[serde(default)]
    pub image_label: Option<String>,
}

impl InlinePredictRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let image = self.image.as_deref().unwrap_or("");
        if image.is_empty() {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: "image is required".to_string(),
            });
        }

        // Base64 inflates by 4/3; cap the encoded length accordingly
        if image.len() > MAX_IMAGE_BYTES / 3 * 4 {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: format!(
                    "image exceeds maximum size of {} bytes",
                    MAX_IMAGE_BYTES
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_rejected() {
        let req = InlinePredictRequest {
            image: None,
            image_label: None,
        };
        assert!(req.validate().is_err());

        let req = InlinePredictRequest {
            image: Some(String::new()),
            image_label: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_valid_image_passes() {
        let req = InlinePredictRequest {
            image: Some("aGVsbG8=".to_string()),
            image_label: Some("car.jpg".to_string()),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_oversized_image_rejected() {
        let req = InlinePredictRequest {
            image: Some("a".repeat(MAX_IMAGE_BYTES / 3 * 4 + 1)),
            image_label: None,
        };
        let err = req.validate().unwrap_err();
        assert!(matches!(err, ApiError::ValidationError { field, .. } if field == "image"));
    }
}
