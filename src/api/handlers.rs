// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static metadata endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::server::AppState;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub name: String,
    pub version: String,
    pub status: String,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub name: String,
    pub version: String,
    pub device: String,
    pub mode: String,
    pub detector: String,
    pub extractor: Option<String>,
    pub extractor_configured: bool,
    pub verification_threshold: f32,
}

pub const ENDPOINTS: &[&str] = &[
    "/api/health",
    "/api/model/info",
    "/api/vin/extract",
    "/api/vin/verify",
    "/api/vin/verifications",
    "/api/vin/verifications/{id}",
    "/api/vin/validate",
];

/// GET /
pub async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        name: version::SERVICE_NAME.to_string(),
        version: version::VERSION_NUMBER.to_string(),
        status: "running".to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

/// GET /api/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /api/model/info
pub async fn model_info_handler(State(state): State<Arc<AppState>>) -> Json<ModelInfoResponse> {
    let (detector, extractor, threshold) = match &state.pipeline {
        Some(pipeline) => (
            pipeline.detector().name().to_string(),
            Some(pipeline.extractor().backend_name()),
            pipeline.verification_threshold(),
        ),
        None => (
            "contour-heuristic".to_string(),
            None,
            state.config.verification_threshold,
        ),
    };

    Json(ModelInfoResponse {
        name: "VIN Extractor".to_string(),
        version: version::VERSION_NUMBER.to_string(),
        device: "cpu".to_string(),
        mode: "contour_heuristic".to_string(),
        detector,
        extractor_configured: extractor.is_some(),
        extractor,
        verification_threshold: threshold,
    })
}
