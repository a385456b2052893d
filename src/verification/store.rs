// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-memory verification record store
//!
//! Records live for the lifetime of the process. All access goes through a
//! single lock, and each update checks and transitions a record under one
//! write guard so concurrent submissions for the same id cannot both win.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::vin::{validate_vin, Vin};

/// Lifecycle state of a verification record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Awaiting operator review
    Pending,
    /// Operator confirmed the detected VIN
    Verified,
    /// Operator rejected the detected VIN
    Corrected,
}

/// A low-confidence extraction awaiting human confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: Uuid,
    pub detected_vin: String,
    pub confidence: f32,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_vin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

impl VerificationRecord {
    fn pending(detected_vin: String, confidence: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            detected_vin,
            confidence,
            status: VerificationStatus::Pending,
            created_at: Utc::now(),
            is_correct: None,
            correct_vin: None,
            verified_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == VerificationStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerificationError {
    #[error("Verification not found: {0}")]
    NotFound(Uuid),

    #[error("Verification {id} already {status:?}")]
    AlreadyResolved {
        id: Uuid,
        status: VerificationStatus,
    },

    #[error("Invalid corrected VIN: {}", .0.join(", "))]
    InvalidCorrection(Vec<String>),
}

/// Record counts by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStats {
    pub total: usize,
    pub pending: usize,
    pub verified: usize,
    pub corrected: usize,
}

/// Owns every verification record; callers interact by id only
#[derive(Debug, Default)]
pub struct VerificationStore {
    records: RwLock<HashMap<Uuid, VerificationRecord>>,
}

impl VerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending record and return its id
    pub async fn create(&self, detected_vin: &Vin, confidence: f32) -> Uuid {
        let record = VerificationRecord::pending(detected_vin.to_string(), confidence);
        let id = record.id;

        let mut records = self.records.write().await;
        records.insert(id, record);
        debug!("Created verification {} for {}", id, detected_vin);
        id
    }

    /// Snapshot of a record
    pub async fn get(&self, id: &Uuid) -> Result<VerificationRecord, VerificationError> {
        let records = self.records.read().await;
        records
            .get(id)
            .cloned()
            .ok_or(VerificationError::NotFound(*id))
    }

    /// Resolve a pending record
    ///
    /// `is_correct = true` moves it to `Verified`, otherwise `Corrected`.
    /// A supplied `correct_vin` is normalized and must be a valid VIN; blank
    /// input counts as absent. On any error the record is left untouched.
    pub async fn update(
        &self,
        id: &Uuid,
        is_correct: bool,
        correct_vin: Option<&str>,
    ) -> Result<VerificationRecord, VerificationError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or(VerificationError::NotFound(*id))?;

        if !record.is_pending() {
            return Err(VerificationError::AlreadyResolved {
                id: *id,
                status: record.status,
            });
        }

        let correct_vin = match correct_vin.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => {
                let validation = validate_vin(raw);
                if !validation.is_valid {
                    return Err(VerificationError::InvalidCorrection(validation.errors));
                }
                Some(validation.vin)
            }
            None => None,
        };

        record.status = if is_correct {
            VerificationStatus::Verified
        } else {
            VerificationStatus::Corrected
        };
        record.is_correct = Some(is_correct);
        record.correct_vin = correct_vin;
        record.verified_at = Some(Utc::now());

        info!("Verification {} resolved as {:?}", id, record.status);
        Ok(record.clone())
    }

    pub async fn stats(&self) -> VerificationStats {
        let records = self.records.read().await;
        records
            .values()
            .fold(VerificationStats::default(), |mut stats, record| {
                stats.total += 1;
                match record.status {
                    VerificationStatus::Pending => stats.pending += 1,
                    VerificationStatus::Verified => stats.verified += 1,
                    VerificationStatus::Corrected => stats.corrected += 1,
                }
                stats
            })
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
