// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! SQLite persistence for users and prediction records
//!
//! The inference pipeline never touches this module: handlers run the
//! pipeline, then persist the outcome here. Queries use the runtime sqlx
//! API so the crate builds without a live database.

mod predictions;
mod users;

pub use predictions::{NewPrediction, PredictionRecord, MODEL_LABEL};
pub use users::{NewUser, UserRecord};

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Idempotent schema, mirroring the service's user/prediction model
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    email           TEXT NOT NULL UNIQUE,
    username        TEXT NOT NULL UNIQUE,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    hashed_password TEXT NOT NULL,
    is_active       INTEGER NOT NULL DEFAULT 1,
    role            TEXT NOT NULL DEFAULT 'user',
    phone_number    TEXT
);

CREATE TABLE IF NOT EXISTS predictions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    image_label TEXT NOT NULL,
    model       TEXT NOT NULL,
    result      TEXT NOT NULL,
    owner_id    INTEGER NOT NULL REFERENCES users(id)
);
"#;

/// Shared handle to the SQLite pool; cheap to clone
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database and apply the schema
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url: {}", url))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("failed to open database")?;

        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .context("failed to apply schema")?;
        }

        tracing::info!("✅ Database ready at {}", url);

        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
