// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VIN endpoint response types

use serde::{Deserialize, Serialize};

use crate::pipeline::ExtractionOutcome;

/// Response from POST /api/vin/extract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: ExtractionOutcome,
}

impl From<ExtractionOutcome> for ExtractResponse {
    fn from(outcome: ExtractionOutcome) -> Self {
        Self {
            success: true,
            outcome,
        }
    }
}

/// Response from POST /api/vin/verify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
}

impl VerifyResponse {
    pub fn submitted() -> Self {
        Self {
            success: true,
            message: "Verification submitted".to_string(),
        }
    }
}
