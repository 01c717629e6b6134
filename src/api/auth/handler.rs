// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Registration and login handlers

use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use super::request::{LoginRequest, RegisterRequest};
use super::response::{RegisteredResponse, TokenResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::auth::{hash_password, verify_password};
use crate::db::NewUser;

/// POST /v1/auth/register - Create a user account
///
/// # Errors
/// - 400 Bad Request: invalid payload, or username/email already taken
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    request.validate()?;

    let taken = state
        .db
        .user_by_username(&request.username)
        .await
        .map_err(|e| {
            warn!("User lookup failed: {:#}", e);
            ApiError::InternalError(e.to_string())
        })?
        .is_some()
        || state
            .db
            .user_by_email(&request.email)
            .await
            .map_err(|e| {
                warn!("User lookup failed: {:#}", e);
                ApiError::InternalError(e.to_string())
            })?
            .is_some();

    if taken {
        return Err(ApiError::InvalidRequest(
            "username or email already registered".to_string(),
        ));
    }

    let user = NewUser {
        email: request.email,
        username: request.username,
        first_name: request.first_name,
        last_name: request.last_name,
        hashed_password: hash_password(&request.password),
        role: request.role,
        phone_number: request.phone_number,
    };

    let id = state.db.insert_user(&user).await.map_err(|e| {
        warn!("User insert failed: {:#}", e);
        ApiError::InternalError(e.to_string())
    })?;

    info!("Registered user '{}' (id {})", user.username, id);

    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            id,
            username: user.username,
        }),
    ))
}

/// POST /v1/auth/login - Exchange credentials for a bearer token
///
/// # Errors
/// - 401 Unauthorized: unknown user, wrong password, or inactive account.
///   The three cases are indistinguishable on the wire.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let denied = || ApiError::Unauthorized("invalid credentials".to_string());

    let user = state
        .db
        .user_by_username(&request.username)
        .await
        .map_err(|e| {
            warn!("User lookup failed: {:#}", e);
            ApiError::InternalError(e.to_string())
        })?
        .ok_or_else(denied)?;

    if !user.is_active || !verify_password(&request.password, &user.hashed_password) {
        return Err(denied());
    }

    let token = state
        .tokens
        .issue(&user.username, user.id, &user.role)
        .map_err(|e| {
            warn!("Token issue failed: {}", e);
            ApiError::InternalError(e.to_string())
        })?;

    info!("User '{}' logged in", user.username);

    Ok(Json(TokenResponse::bearer(token)))
}
