// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User endpoint request types

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Request for PUT /v1/users/password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.new_password.len() < 8 {
            return Err(ApiError::ValidationError {
                field: "new_password".to_string(),
                message: "password must be at least 8 characters".to_string(),
            });
        }
        Ok(())
    }
}
