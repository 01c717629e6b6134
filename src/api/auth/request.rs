// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Auth request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Minimum password length accepted at registration
const MIN_PASSWORD_LEN: usize = 8;

/// Request for POST /v1/auth/register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    /// Defaults to "user"
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "username".to_string(),
                message: "username is required".to_string(),
            });
        }
        if !self.email.contains('@') {
            return Err(ApiError::ValidationError {
                field: "email".to_string(),
                message: "email is not valid".to_string(),
            });
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::ValidationError {
                field: "password".to_string(),
                message: format!("password must be at least {} characters", MIN_PASSWORD_LEN),
            });
        }
        if self.role != "user" && self.role != "admin" {
            return Err(ApiError::ValidationError {
                field: "role".to_string(),
                message: format!("unknown role '{}'", self.role),
            });
        }
        Ok(())
    }
}

/// Request for POST /v1/auth/login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterRequest {
        RegisterRequest {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "correct-horse".to_string(),
            role: "user".to_string(),
            phone_number: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_empty_username_rejected() {
        let mut req = valid();
        req.username = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut req = valid();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_short_password_rejected() {
        let mut req = valid();
        req.password = "short".to_string();
        let err = req.validate().unwrap_err();
        assert!(matches!(err, ApiError::ValidationError { field, .. } if field == "password"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut req = valid();
        req.role = "superuser".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_role_defaults_to_user() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.c","username":"ada","first_name":"Ada",
                "last_name":"Lovelace","password":"correct-horse"}"#,
        )
        .unwrap();
        assert_eq!(req.role, "user");
    }
}
