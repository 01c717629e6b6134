// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Auth API endpoints
//!
//! Provides POST /v1/auth/register and /v1/auth/login, plus the
//! `AuthUser` extractor guarding every protected route.

pub mod extractor;
pub mod handler;
pub mod request;
pub mod response;

pub use extractor::AuthUser;
pub use handler::{login_handler, register_handler};
pub use request::{LoginRequest, RegisterRequest};
pub use response::{RegisteredResponse, TokenResponse};
