// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoints
//!
//! POST runs the detect -> crop -> recognize pipeline over the uploaded
//! photo and persists the outcome under the caller's account. The
//! remaining handlers are owner-scoped CRUD over stored records.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::Multipart;
use image::DynamicImage;
use tracing::{debug, error, info, warn};

use super::request::InlinePredictRequest;
use super::response::PredictResponse;
use crate::api::auth::AuthUser;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::db::{NewPrediction, PredictionRecord};
use crate::vision::plate::{PipelineOutcome, PlateError};
use crate::vision::{decode_base64_image, decode_image_bytes};

/// Label stored when the upload carries no filename
const DEFAULT_IMAGE_LABEL: &str = "upload";

/// POST /v1/predictions - Read the plate off an uploaded photo
///
/// Accepts a multipart form with an `image` file field.
///
/// # Responses
/// - 201 Created: plate found; body carries the persisted record
/// - 200 OK with `detected: false`: no plate found (nothing persisted)
/// - 400 Bad Request: missing field or undecodable image
/// - 500 Internal Server Error: pipeline failure (opaque message)
pub async fn predict_handler(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PredictResponse>), ApiError> {
    let mut image_bytes = None;
    let mut image_label = DEFAULT_IMAGE_LABEL.to_string();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::InvalidRequest(format!("malformed multipart body: {}", e))
    })? {
        if field.name() == Some("image") {
            if let Some(name) = field.file_name() {
                image_label = name.to_string();
            }
            let bytes = field.bytes().await.map_err(|e| {
                ApiError::InvalidRequest(format!("failed to read image field: {}", e))
            })?;
            image_bytes = Some(bytes);
        }
    }

    let bytes = image_bytes.ok_or_else(|| ApiError::ValidationError {
        field: "image".to_string(),
        message: "multipart field 'image' is required".to_string(),
    })?;

    let (image, info) = decode_image_bytes(&bytes)
        .map_err(|e| ApiError::InvalidRequest(format!("invalid image: {}", e)))?;

    debug!(
        "Prediction upload '{}': {}x{}, {} bytes",
        image_label, info.width, info.height, info.size_bytes
    );

    run_and_store(&state, &user, image, image_label).await
}

/// POST /v1/predictions/inline - JSON variant with a base64 image
pub async fn predict_inline_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<InlinePredictRequest>,
) -> Result<(StatusCode, Json<PredictResponse>), ApiError> {
    request.validate()?;

    let encoded = request.image.as_deref().unwrap_or_default();
    let (image, info) = decode_base64_image(encoded)
        .map_err(|e| ApiError::InvalidRequest(format!("invalid image: {}", e)))?;

    let image_label = request
        .image_label
        .unwrap_or_else(|| DEFAULT_IMAGE_LABEL.to_string());

    debug!(
        "Inline prediction '{}': {}x{}, {} bytes",
        image_label, info.width, info.height, info.size_bytes
    );

    run_and_store(&state, &user, image, image_label).await
}

/// Run one pipeline pass and persist a successful outcome
async fn run_and_store(
    state: &AppState,
    user: &AuthUser,
    image: DynamicImage,
    image_label: String,
) -> Result<(StatusCode, Json<PredictResponse>), ApiError> {
    let pipeline = state.pipeline.clone();

    // Model inference is blocking CPU/GPU work; keep it off the runtime
    let outcome = tokio::task::spawn_blocking(move || pipeline.run(&image))
        .await
        .map_err(|e| {
            error!("Pipeline task panicked: {}", e);
            ApiError::InternalError(e.to_string())
        })?
        .map_err(map_pipeline_error)?;

    match outcome {
        PipelineOutcome::Success {
            text,
            detection_confidence,
            ocr_confidence,
        } => {
            let record = state
                .db
                .insert_prediction(&NewPrediction {
                    image_label,
                    result: text,
                    owner_id: user.id,
                })
                .await
                .map_err(|e| {
                    error!("Prediction insert failed: {:#}", e);
                    ApiError::InternalError(e.to_string())
                })?;

            info!(
                "Stored prediction {} ('{}') for user '{}'",
                record.id, record.result, user.username
            );

            Ok((
                StatusCode::CREATED,
                Json(PredictResponse::detected(
                    record,
                    detection_confidence,
                    ocr_confidence,
                )),
            ))
        }
        PipelineOutcome::NoDetection => {
            info!("No plate detected for user '{}'", user.username);
            Ok((StatusCode::OK, Json(PredictResponse::not_detected())))
        }
    }
}

/// Map pipeline failures onto the API taxonomy.
///
/// User errors surface as 400 with detail; everything else is logged in
/// full and returned opaque.
fn map_pipeline_error(err: PlateError) -> ApiError {
    if err.is_user_error() {
        warn!("Prediction rejected: {}", err);
        ApiError::InvalidRequest(err.to_string())
    } else {
        error!("Pipeline failure: {}", err);
        ApiError::InternalError(err.to_string())
    }
}

/// GET /v1/predictions - All of the caller's records
pub async fn list_predictions_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PredictionRecord>>, ApiError> {
    let records = state
        .db
        .predictions_for_owner(user.id)
        .await
        .map_err(|e| {
            error!("Prediction list failed: {:#}", e);
            ApiError::InternalError(e.to_string())
        })?;

    Ok(Json(records))
}

/// GET /v1/predictions/{id} - One owned record
pub async fn get_prediction_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<PredictionRecord>, ApiError> {
    state
        .db
        .prediction_for_owner(id, user.id)
        .await
        .map_err(|e| {
            error!("Prediction fetch failed: {:#}", e);
            ApiError::InternalError(e.to_string())
        })?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("prediction not found".to_string()))
}

/// DELETE /v1/predictions/{id} - Remove one owned record
pub async fn delete_prediction_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .db
        .delete_prediction(id, user.id)
        .await
        .map_err(|e| {
            error!("Prediction delete failed: {:#}", e);
            ApiError::InternalError(e.to_string())
        })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("prediction not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_image_maps_to_bad_request() {
        let api_err = map_pipeline_error(PlateError::InvalidImage("bad bytes".into()));
        assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_pipeline_failures_map_to_opaque_500() {
        for err in [
            PlateError::NoTextRecognized,
            PlateError::InferenceRuntime {
                stage: "detection",
                detail: "bad shape".into(),
            },
        ] {
            let api_err = map_pipeline_error(err);
            assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            // The wire body must not carry pipeline internals
            let body = api_err.to_response();
            assert_eq!(body.message, "internal server error");
        }
    }
}
