// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::{build_router, start_server, ApiError, AppState};
pub use auth::{TokenManager, DEFAULT_TOKEN_TTL_MINUTES};
pub use config::NodeConfig;
pub use db::{Database, NewPrediction, PredictionRecord, UserRecord, MODEL_LABEL};
pub use vision::{
    PipelineOutcome, PlateBox, PlateError, PlateModelConfig, PlateModelManager, PlatePipeline,
};
