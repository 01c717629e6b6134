// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User API endpoints
//!
//! Provides GET /v1/users/me and PUT /v1/users/password.

pub mod handler;
pub mod request;

pub use handler::{change_password_handler, me_handler, UserResponse};
pub use request::ChangePasswordRequest;
