// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP tests for the /api/vin endpoints
//!
//! These tests verify that:
//! - extract -> verify -> fetch round-trips through the shared store
//! - Upload problems map to 400 and a missing extractor to 503
//! - Unknown and resolved verifications map to 404 and 409

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use fabstir_vin_node::{
    api::{create_app, AppState},
    pipeline::ExtractionPipeline,
    verification::VerificationStore,
    vision::ContourRegionDetector,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use crate::support::{
    multipart_body, multipart_content_type, plate_image, png_bytes, FailingExtractor,
    StaticExtractor, CORRECTED_VIN, VALID_VIN,
};

/// Helper: State with the contour detector and a fixed reading
fn state_with_extractor(confidence: f32) -> Arc<AppState> {
    let pipeline = ExtractionPipeline::new(
        Arc::new(ContourRegionDetector::default()),
        StaticExtractor::new(VALID_VIN, confidence),
        Arc::new(VerificationStore::new()),
    );
    Arc::new(AppState::new_for_test().with_pipeline(pipeline))
}

/// Helper: State with no text extractor configured
fn state_without_extractor() -> Arc<AppState> {
    Arc::new(AppState::new_for_test())
}

fn app(state: &Arc<AppState>) -> Router {
    create_app(state.clone())
}

fn extract_request(file: Option<&[u8]>, require_verification: Option<&str>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/vin/extract")
        .header("content-type", multipart_content_type())
        .body(Body::from(multipart_body(file, require_verification)))
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_extract_verify_fetch_round_trip() {
    let state = state_with_extractor(0.9);
    let image = png_bytes(plate_image());

    // 1. Extract with verification requested: 0.9 * 0.74 < 0.75
    let response = app(&state)
        .oneshot(extract_request(Some(&image), Some("TRUE")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let extracted = body_json(response).await;
    assert_eq!(extracted["success"], true);
    assert_eq!(extracted["has_vin"], true);
    assert_eq!(extracted["vin"], VALID_VIN);
    assert_eq!(extracted["method"], "ocr");
    assert_eq!(extracted["bbox"], json!([400, 380, 600, 400]));
    assert_eq!(extracted["needs_verification"], true);
    assert_eq!(extracted["message"], "VIN extracted successfully");
    let id = extracted["verification_id"].as_str().unwrap().to_string();

    // 2. Record is pending
    let response = app(&state)
        .oneshot(get_request(&format!("/api/vin/verifications/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "pending");

    // 3. Operator corrects it
    let response = app(&state)
        .oneshot(json_request(
            Method::POST,
            "/api/vin/verify",
            json!({"verification_id": id, "is_correct": false, "correct_vin": CORRECTED_VIN}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "message": "Verification submitted"})
    );

    // 4. Record reflects the correction
    let response = app(&state)
        .oneshot(get_request(&format!("/api/vin/verifications/{}", id)))
        .await
        .unwrap();
    let record = body_json(response).await;
    assert_eq!(record["status"], "corrected");
    assert_eq!(record["correct_vin"], CORRECTED_VIN);
    assert_eq!(record["detected_vin"], VALID_VIN);
    assert!(record["verified_at"].is_string());

    // 5. Second submission conflicts
    let response = app(&state)
        .oneshot(json_request(
            Method::POST,
            "/api/vin/verify",
            json!({"verification_id": id, "is_correct": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_extract_without_verification_flag() {
    let state = state_with_extractor(0.9);
    let image = png_bytes(plate_image());

    let response = app(&state)
        .oneshot(extract_request(Some(&image), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["has_vin"], true);
    assert_eq!(body["needs_verification"], false);
    assert!(body["verification_id"].is_null());
    assert!(state.store.is_empty().await);
}

#[tokio::test]
async fn test_non_true_flag_does_not_opt_in() {
    let state = state_with_extractor(0.9);
    let image = png_bytes(plate_image());

    let response = app(&state)
        .oneshot(extract_request(Some(&image), Some("yes")))
        .await
        .unwrap();

    assert_eq!(body_json(response).await["needs_verification"], false);
}

#[tokio::test]
async fn test_extract_missing_file() {
    let state = state_with_extractor(0.9);

    let response = app(&state)
        .oneshot(extract_request(None, Some("true")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn test_extract_non_multipart_body() {
    let state = state_with_extractor(0.9);

    let response = app(&state)
        .oneshot(json_request(Method::POST, "/api/vin/extract", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file provided");
}

#[tokio::test]
async fn test_extract_undecodable_image() {
    let state = state_with_extractor(0.9);

    let response = app(&state)
        .oneshot(extract_request(Some(b"this is not an image"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_extract_without_extractor() {
    let state = state_without_extractor();
    let image = png_bytes(plate_image());

    let response = app(&state)
        .oneshot(extract_request(Some(&image), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error_type"], "service_unavailable");
}

#[tokio::test]
async fn test_extractor_failure_is_500() {
    let pipeline = ExtractionPipeline::new(
        Arc::new(ContourRegionDetector::default()),
        Arc::new(FailingExtractor),
        Arc::new(VerificationStore::new()),
    );
    let state = Arc::new(AppState::new_for_test().with_pipeline(pipeline));
    let image = png_bytes(plate_image());

    let response = app(&state)
        .oneshot(extract_request(Some(&image), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "internal_error");
}

#[tokio::test]
async fn test_verify_unknown_id() {
    let state = state_with_extractor(0.9);

    for id in ["3b241101-e2bb-4255-8caf-4136c566a962", "not-a-uuid"] {
        let response = app(&state)
            .oneshot(json_request(
                Method::POST,
                "/api/vin/verify",
                json!({"verification_id": id, "is_correct": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Verification not found");
    }
    assert!(state.store.is_empty().await);
}

#[tokio::test]
async fn test_get_unknown_verification() {
    let state = state_without_extractor();

    let response = app(&state)
        .oneshot(get_request(
            "/api/vin/verifications/3b241101-e2bb-4255-8caf-4136c566a962",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app(&state)
        .oneshot(get_request("/api/vin/verifications/garbage"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verify_with_invalid_correction() {
    let state = state_with_extractor(0.5);
    let image = png_bytes(plate_image());

    let response = app(&state)
        .oneshot(extract_request(Some(&image), Some("true")))
        .await
        .unwrap();
    let id = body_json(response).await["verification_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app(&state)
        .oneshot(json_request(
            Method::POST,
            "/api/vin/verify",
            json!({"verification_id": id, "is_correct": false, "correct_vin": "WBA3A5C51CF25665"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["details"]["errors"][0], "Length must be 17, got 16");

    // Still pending, so a valid submission goes through
    let response = app(&state)
        .oneshot(json_request(
            Method::POST,
            "/api/vin/verify",
            json!({"verification_id": id, "is_correct": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_validate_endpoint() {
    let state = state_without_extractor();

    let response = app(&state)
        .oneshot(json_request(
            Method::POST,
            "/api/vin/validate",
            json!({"vin": "1hg-cm826 33a004352"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"vin": VALID_VIN, "is_valid": true, "errors": []})
    );

    let response = app(&state)
        .oneshot(json_request(
            Method::POST,
            "/api/vin/validate",
            json!({"vin": "1HGCM82633A00435Q"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["errors"], json!(["Forbidden character: Q"]));
}

#[tokio::test]
async fn test_extract_rejects_get() {
    let state = state_with_extractor(0.9);

    let response = app(&state)
        .oneshot(get_request("/api/vin/extract"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_verification_stats_endpoint() {
    let state = state_with_extractor(0.5);
    let image = png_bytes(plate_image());

    for _ in 0..2 {
        app(&state)
            .oneshot(extract_request(Some(&image), Some("true")))
            .await
            .unwrap();
    }
    let pending = state.store.len().await;
    assert_eq!(pending, 2);

    let response = app(&state)
        .oneshot(get_request("/api/vin/verifications"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"total": 2, "pending": 2, "verified": 0, "corrected": 0})
    );
}

#[tokio::test]
async fn test_malformed_json_gets_structured_error() {
    let state = state_without_extractor();

    let broken = Request::builder()
        .method(Method::POST)
        .uri("/api/vin/verify")
        .header("content-type", "application/json")
        .body(Body::from("{\"verification_id\": "))
        .unwrap();
    let response = app(&state).oneshot(broken).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "invalid_request");

    // Missing is_correct
    let response = app(&state)
        .oneshot(json_request(
            Method::POST,
            "/api/vin/verify",
            json!({"verification_id": "3b241101-e2bb-4255-8caf-4136c566a962"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_type"], "invalid_request");

    let response = app(&state)
        .oneshot(json_request(Method::POST, "/api/vin/validate", json!({"plate": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}
