// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use fabstir_vin_node::{
    api::{start_server, AppState},
    config::ServiceConfig,
    version,
};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("Starting {}", version::get_version_string());
    info!("Build: {}", version::VERSION);

    let config = ServiceConfig::from_env();
    config.validate().map_err(|e| anyhow!(e))?;
    info!(
        "Configuration: {}:{}, verification threshold {}, VLM endpoint {}",
        config.host,
        config.port,
        config.verification_threshold,
        config.vlm_endpoint.as_deref().unwrap_or("<none>")
    );

    let state = AppState::from_config(config)?;
    start_server(state).await
}
