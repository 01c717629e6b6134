// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction repository
//!
//! Every query is owner-scoped: a user only ever sees or deletes their
//! own records.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Database;

/// Model label stored with every prediction
pub const MODEL_LABEL: &str = "YOLOv11 + OCR";

/// A persisted prediction
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    /// Original upload filename (or "upload" when absent)
    pub image_label: String,
    /// Model label, e.g. "YOLOv11 + OCR"
    pub model: String,
    /// Recognized plate text
    pub result: String,
    pub owner_id: i64,
}

/// Fields for persisting a successful pipeline outcome
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub image_label: String,
    pub result: String,
    pub owner_id: i64,
}

impl Database {
    /// Persist a prediction, returning the stored record
    pub async fn insert_prediction(&self, prediction: &NewPrediction) -> Result<PredictionRecord> {
        let result = sqlx::query(
            "INSERT INTO predictions (image_label, model, result, owner_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&prediction.image_label)
        .bind(MODEL_LABEL)
        .bind(&prediction.result)
        .bind(prediction.owner_id)
        .execute(self.pool())
        .await
        .context("failed to insert prediction")?;

        Ok(PredictionRecord {
            id: result.last_insert_rowid(),
            image_label: prediction.image_label.clone(),
            model: MODEL_LABEL.to_string(),
            result: prediction.result.clone(),
            owner_id: prediction.owner_id,
        })
    }

    pub async fn predictions_for_owner(&self, owner_id: i64) -> Result<Vec<PredictionRecord>> {
        sqlx::query_as::<_, PredictionRecord>(
            "SELECT * FROM predictions WHERE owner_id = ? ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await
        .context("failed to list predictions")
    }

    pub async fn prediction_for_owner(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<PredictionRecord>> {
        sqlx::query_as::<_, PredictionRecord>(
            "SELECT * FROM predictions WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool())
        .await
        .context("failed to fetch prediction")
    }

    /// Delete an owned prediction; false when absent or owned by another
    pub async fn delete_prediction(&self, id: i64, owner_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM predictions WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool())
            .await
            .context("failed to delete prediction")?;

        Ok(result.rows_affected() > 0)
    }
}
