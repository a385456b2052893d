// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use super::handlers::{health_handler, index_handler, model_info_handler};
use super::vin::{
    extract_handler, get_verification_handler, validate_handler, verification_stats_handler,
    verify_handler,
};
use crate::config::ServiceConfig;
use crate::pipeline::ExtractionPipeline;
use crate::verification::VerificationStore;
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::{ContourRegionDetector, VlmTextExtractor};

/// Headroom for multipart boundaries and form fields around the image
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub store: Arc<VerificationStore>,
    /// Absent when no text extractor is configured
    pub pipeline: Option<Arc<ExtractionPipeline>>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        store: Arc<VerificationStore>,
        pipeline: Option<Arc<ExtractionPipeline>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            pipeline,
        }
    }

    /// Build the state from configuration
    ///
    /// The store is created here and shared with the pipeline. Without a
    /// VLM endpoint the node still serves validation and verification.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let store = Arc::new(VerificationStore::new());

        let pipeline = match &config.vlm_endpoint {
            Some(endpoint) => {
                let extractor = VlmTextExtractor::new(endpoint, &config.vlm_model)?;
                let pipeline = ExtractionPipeline::new(
                    Arc::new(ContourRegionDetector::default()),
                    Arc::new(extractor),
                    store.clone(),
                )
                .with_verification_threshold(config.verification_threshold);
                Some(Arc::new(pipeline))
            }
            None => {
                warn!("VLM_ENDPOINT not set, VIN extraction disabled");
                None
            }
        };

        Ok(Self::new(config, store, pipeline))
    }

    /// State with default configuration and no text extractor
    pub fn new_for_test() -> Self {
        Self::new(
            ServiceConfig::default(),
            Arc::new(VerificationStore::new()),
            None,
        )
    }

    /// Replace the pipeline, sharing its verification store
    pub fn with_pipeline(mut self, pipeline: ExtractionPipeline) -> Self {
        self.store = pipeline.store().clone();
        self.pipeline = Some(Arc::new(pipeline));
        self
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/model/info", get(model_info_handler))
        .route("/api/vin/extract", post(extract_handler))
        .route("/api/vin/verify", post(verify_handler))
        .route("/api/vin/verifications", get(verification_stats_handler))
        .route("/api/vin/verifications/:id", get(get_verification_handler))
        .route("/api/vin/validate", post(validate_handler))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + MULTIPART_OVERHEAD))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<()> {
    let addr = state
        .config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!(e))?;
    let app = create_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("VIN API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("VIN API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
