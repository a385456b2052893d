// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Verification record lifecycle tests
//!
//! Records move pending -> verified or pending -> corrected exactly once.

use fabstir_vin_node::{
    verification::{VerificationError, VerificationStatus, VerificationStore},
    vin::Vin,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::support::{CORRECTED_VIN, VALID_VIN};

fn detected_vin() -> Vin {
    Vin::parse(VALID_VIN).unwrap()
}

#[tokio::test]
async fn test_verified_lifecycle() {
    let store = VerificationStore::new();
    let id = store.create(&detected_vin(), 0.6).await;

    let before = store.get(&id).await.unwrap();
    assert_eq!(before.status, VerificationStatus::Pending);

    let after = store.update(&id, true, None).await.unwrap();
    assert_eq!(after.status, VerificationStatus::Verified);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.detected_vin, before.detected_vin);
    assert!(after.verified_at.unwrap() >= after.created_at);
}

#[tokio::test]
async fn test_corrected_lifecycle() {
    let store = VerificationStore::new();
    let id = store.create(&detected_vin(), 0.6).await;

    store
        .update(&id, false, Some(CORRECTED_VIN))
        .await
        .unwrap();

    let record = store.get(&id).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Corrected);
    assert_eq!(record.correct_vin.as_deref(), Some(CORRECTED_VIN));
    assert_eq!(record.is_correct, Some(false));
}

#[tokio::test]
async fn test_no_transition_after_resolution() {
    let store = VerificationStore::new();
    let id = store.create(&detected_vin(), 0.6).await;
    store.update(&id, false, None).await.unwrap();

    for is_correct in [true, false] {
        let err = store.update(&id, is_correct, None).await.unwrap_err();
        assert!(matches!(
            err,
            VerificationError::AlreadyResolved {
                status: VerificationStatus::Corrected,
                ..
            }
        ));
    }
}

#[tokio::test]
async fn test_unknown_id_does_not_create() {
    let store = VerificationStore::new();
    store.create(&detected_vin(), 0.6).await;

    let unknown = Uuid::new_v4();
    let err = store.update(&unknown, true, None).await.unwrap_err();
    assert_eq!(err, VerificationError::NotFound(unknown));
    assert_eq!(store.len().await, 1);
    assert!(store.get(&unknown).await.is_err());
}

#[tokio::test]
async fn test_records_are_independent() {
    let store = VerificationStore::new();
    let a = store.create(&detected_vin(), 0.4).await;
    let b = store.create(&detected_vin(), 0.5).await;

    store.update(&a, true, None).await.unwrap();

    assert_eq!(store.get(&a).await.unwrap().status, VerificationStatus::Verified);
    assert_eq!(store.get(&b).await.unwrap().status, VerificationStatus::Pending);
    let stats = store.stats().await;
    assert_eq!((stats.total, stats.pending, stats.verified), (2, 1, 1));
}

#[tokio::test]
async fn test_racing_submissions_have_one_winner() {
    let store = Arc::new(VerificationStore::new());
    let id = store.create(&detected_vin(), 0.6).await;

    let verify = {
        let store = store.clone();
        tokio::spawn(async move { store.update(&id, true, None).await })
    };
    let correct = {
        let store = store.clone();
        tokio::spawn(async move { store.update(&id, false, Some(CORRECTED_VIN)).await })
    };

    let results = [verify.await.unwrap(), correct.await.unwrap()];
    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);

    let record = store.get(&id).await.unwrap();
    assert_eq!(&record, winners[0]);
}

#[tokio::test]
async fn test_record_serialization() {
    let store = VerificationStore::new();
    let id = store.create(&detected_vin(), 0.6).await;

    let pending = serde_json::to_value(store.get(&id).await.unwrap()).unwrap();
    assert_eq!(pending["status"], "pending");
    assert_eq!(pending["id"], id.to_string());
    assert!(pending.get("verified_at").is_none());

    store.update(&id, true, None).await.unwrap();
    let verified = serde_json::to_value(store.get(&id).await.unwrap()).unwrap();
    assert_eq!(verified["status"], "verified");
    assert_eq!(verified["is_correct"], true);
    assert!(verified["verified_at"].is_string());
}
