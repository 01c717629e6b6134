// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenManager;
use crate::db::Database;
use crate::vision::{PlatePipeline, MAX_IMAGE_BYTES};

use super::auth::{login_handler, register_handler};
use super::predictions::{
    delete_prediction_handler, get_prediction_handler, list_predictions_handler,
    predict_handler, predict_inline_handler,
};
use super::users::{change_password_handler, me_handler};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PlatePipeline,
    pub db: Database,
    pub tokens: Arc<TokenManager>,
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Auth
        .route("/v1/auth/register", post(register_handler))
        .route("/v1/auth/login", post(login_handler))
        // Current user
        .route("/v1/users/me", get(me_handler))
        .route("/v1/users/password", put(change_password_handler))
        // Predictions
        .route(
            "/v1/predictions",
            post(predict_handler).get(list_predictions_handler),
        )
        .route("/v1/predictions/inline", post(predict_inline_handler))
        .route(
            "/v1/predictions/:id",
            get(get_prediction_handler).delete(delete_prediction_handler),
        )
        // Uploads are larger than axum's default body cap
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn start_server(listen_addr: &str, state: AppState) -> anyhow::Result<()> {
    let addr = listen_addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

async fn health_handler(State(_state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model": crate::db::MODEL_LABEL,
        "version": crate::version::VERSION_NUMBER,
    }))
}
