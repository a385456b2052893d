// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VIN endpoint handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::request::{
    parse_flag, ExtractRequest, ValidateRequest, VerifyRequest, FILE_FIELD,
    REQUIRE_VERIFICATION_FIELD,
};
use super::response::{ExtractResponse, VerifyResponse};
use crate::api::errors::ApiError;
use crate::api::server::AppState;
use crate::verification::{VerificationRecord, VerificationStats};
use crate::vin::{validate_vin, ValidationResult};

/// POST /api/vin/extract - Locate and read a VIN in an uploaded image
///
/// # Request (multipart/form-data)
/// - `file`: Image bytes (required)
/// - `require_verification`: `"true"` opts into human review of
///   low-confidence results (default false)
///
/// # Errors
/// - 400 Bad Request: no file, or the file is not a decodable image
/// - 503 Service Unavailable: no text extractor configured
/// - 500 Internal Server Error: extraction failed
pub async fn extract_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let request = match multipart {
        Ok(multipart) => read_extract_request(multipart).await?,
        Err(rejection) => {
            debug!("Not a multipart request: {}", rejection);
            ExtractRequest::default()
        }
    };
    let image = request.image_bytes()?;

    let pipeline = state.pipeline.as_ref().ok_or_else(|| {
        warn!("VIN extraction requested but no text extractor is configured");
        ApiError::ServiceUnavailable("No text extractor configured".to_string())
    })?;

    debug!(
        "VIN extract request: {} bytes, require_verification={}",
        image.len(),
        request.require_verification
    );

    let outcome = pipeline
        .extract_vin(image, request.require_verification)
        .await?;
    Ok(Json(outcome.into()))
}

async fn read_extract_request(mut multipart: Multipart) -> Result<ExtractRequest, ApiError> {
    let mut request = ExtractRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some(FILE_FIELD) => {
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read file: {}", e))
                })?;
                request.file = Some(bytes.to_vec());
            }
            Some(REQUIRE_VERIFICATION_FIELD) => {
                let value = field.text().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read form field: {}", e))
                })?;
                request.require_verification = parse_flag(&value);
            }
            _ => {}
        }
    }

    Ok(request)
}

/// POST /api/vin/verify - Confirm or correct a pending extraction
pub async fn verify_handler(
    State(state): State<Arc<AppState>>,
    request: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Json(request) = request.map_err(json_rejection)?;
    let id = request.parsed_id()?;

    state
        .store
        .update(&id, request.is_correct, request.correct_vin.as_deref())
        .await?;

    info!("Verification {} submitted (correct={})", id, request.is_correct);
    Ok(Json(VerifyResponse::submitted()))
}

/// GET /api/vin/verifications/:id - Fetch a verification record
pub async fn get_verification_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VerificationRecord>, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::NotFound("Verification not found".to_string()))?;
    let record = state.store.get(&id).await?;
    Ok(Json(record))
}

/// GET /api/vin/verifications - Record counts by status
pub async fn verification_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Json<VerificationStats> {
    Json(state.store.stats().await)
}

/// POST /api/vin/validate - Format-check a VIN without an image
pub async fn validate_handler(
    request: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidationResult>, ApiError> {
    let Json(request) = request.map_err(json_rejection)?;
    Ok(Json(validate_vin(&request.vin)))
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    debug!("Rejected JSON body: {}", rejection);
    ApiError::InvalidRequest(rejection.body_text())
}
