// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction API endpoints
//!
//! Provides POST /v1/predictions (multipart), POST /v1/predictions/inline
//! (base64 JSON), and owner-scoped list/get/delete.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{
    delete_prediction_handler, get_prediction_handler, list_predictions_handler,
    predict_handler, predict_inline_handler,
};
pub use request::InlinePredictRequest;
pub use response::PredictResponse;
