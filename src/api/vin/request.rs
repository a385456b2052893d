// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VIN endpoint request types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the verification opt-in
pub const REQUIRE_VERIFICATION_FIELD: &str = "require_verification";

/// Parsed multipart extraction request
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest {
    pub file: Option<Vec<u8>>,
    pub require_verification: bool,
}

impl ExtractRequest {
    /// Image bytes, or the "No file provided" error
    pub fn image_bytes(&self) -> Result<&[u8], ApiError> {
        self.file
            .as_deref()
            .ok_or_else(|| ApiError::InvalidRequest("No file provided".to_string()))
    }
}

/// Only a case-insensitive "true" opts in
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Operator decision on a pending verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub verification_id: String,
    pub is_correct: bool,
    #[serde(default)]
    pub correct_vin: Option<String>,
}

impl VerifyRequest {
    /// Ids that are not UUIDs cannot name a record, so they are not found
    pub fn parsed_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(self.verification_id.trim())
            .map_err(|_| ApiError::NotFound("Verification not found".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub vin: String,
}
