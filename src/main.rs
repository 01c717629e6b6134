// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use lpr_node::{
    api::{start_server, AppState},
    auth::TokenManager,
    config::NodeConfig,
    db::Database,
    vision::PlateModelManager,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = NodeConfig::parse();

    println!("🚀 Starting LPR Node...\n");
    println!("📦 BUILD VERSION: {}", lpr_node::version::VERSION);
    println!();

    // Load both plate models up front. A model that fails to load is a
    // fatal condition: refuse to serve rather than degrade.
    println!("🧠 Loading plate models...");
    let models = match PlateModelManager::new(&config.model_config()).await {
        Ok(models) => models,
        Err(e) => {
            tracing::error!("Model loading failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    println!("✅ Plate models ready");

    let db = Database::connect(&config.database_url).await?;

    let state = AppState {
        pipeline: models.pipeline(),
        db,
        tokens: Arc::new(TokenManager::new(
            &config.jwt_secret,
            config.token_ttl_minutes,
        )),
    };

    println!("🌐 Serving on {}", config.listen_addr);
    start_server(&config.listen_addr, state).await
}
