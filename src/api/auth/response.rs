// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Auth response types

use serde::{Deserialize, Serialize};

/// Response for a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Response for a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredResponse {
    pub id: i64,
    pub username: String,
}
