// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod auth;
pub mod errors;
pub mod http_server;
pub mod predictions;
pub mod users;

pub use auth::{AuthUser, LoginRequest, RegisterRequest, TokenResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{build_router, start_server, AppState};
pub use predictions::{InlinePredictRequest, PredictResponse};
pub use users::UserResponse;
