// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User repository

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::FromRow;

use super::Database;

/// A stored user account
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub role: String,
    pub phone_number: Option<String>,
}

/// Fields for creating an account; the password arrives already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub hashed_password: String,
    pub role: String,
    pub phone_number: Option<String>,
}

impl Database {
    /// Insert a new user, returning its id
    pub async fn insert_user(&self, user: &NewUser) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO users \
             (email, username, first_name, last_name, hashed_password, is_active, role, phone_number) \
             VALUES (?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.hashed_password)
        .bind(&user.role)
        .bind(&user.phone_number)
        .execute(self.pool())
        .await
        .context("failed to insert user")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool())
            .await
            .context("failed to query user by username")
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .context("failed to query user by email")
    }

    pub async fn user_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("failed to query user by id")
    }

    /// Replace a user's password hash
    pub async fn update_password(&self, user_id: i64, hashed_password: &str) -> Result<()> {
        sqlx::query("UPDATE users SET hashed_password = ? WHERE id = ?")
            .bind(hashed_password)
            .bind(user_id)
            .execute(self.pool())
            .await
            .context("failed to update password")?;
        Ok(())
    }
}
