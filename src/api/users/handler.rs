// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Current-user endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::request::ChangePasswordRequest;
use crate::api::auth::AuthUser;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::auth::{hash_password, verify_password};
use crate::db::UserRecord;

/// Profile returned by GET /v1/users/me
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub phone_number: Option<String>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            phone_number: user.phone_number,
        }
    }
}

/// GET /v1/users/me - The authenticated user's profile
pub async fn me_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let record = state
        .db
        .user_by_id(user.id)
        .await
        .map_err(|e| {
            warn!("User lookup failed: {:#}", e);
            ApiError::InternalError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    Ok(Json(record.into()))
}

/// PUT /v1/users/password - Change the authenticated user's password
///
/// The current password is verified first; a wrong one is 401, not 400.
pub async fn change_password_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    let record = state
        .db
        .user_by_id(user.id)
        .await
        .map_err(|e| {
            warn!("User lookup failed: {:#}", e);
            ApiError::InternalError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    if !verify_password(&request.current_password, &record.hashed_password) {
        return Err(ApiError::Unauthorized(
            "current password is incorrect".to_string(),
        ));
    }

    state
        .db
        .update_password(user.id, &hash_password(&request.new_password))
        .await
        .map_err(|e| {
            warn!("Password update failed: {:#}", e);
            ApiError::InternalError(e.to_string())
        })?;

    info!("User '{}' changed password", user.username);

    Ok(StatusCode::NO_CONTENT)
}
