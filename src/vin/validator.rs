// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VIN format validation
//!
//! Validation runs in a fixed order and stops at the first problem:
//! 1. Normalize (uppercase, strip spaces and hyphens)
//! 2. Length must be exactly 17
//! 3. Scan left to right; the first forbidden (I, O, Q) or otherwise
//!    invalid character ends the scan

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Required VIN length
pub const VIN_LENGTH: usize = 17;

/// The 33 symbols allowed in a VIN
pub const VIN_CHARS: &str = "ABCDEFGHJKLMNPRSTUVWXYZ0123456789";

/// Letters excluded from VINs to avoid confusion with 1 and 0
pub const FORBIDDEN_CHARS: [char; 3] = ['I', 'O', 'Q'];

/// Structural reason a VIN was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VinValidationError {
    #[error("Length must be 17, got {0}")]
    WrongLength(usize),

    #[error("Forbidden character: {0}")]
    ForbiddenCharacter(char),

    #[error("Invalid character: {0}")]
    InvalidCharacter(char),
}

/// Outcome of validating a raw VIN string
///
/// Rejections are data, not errors: `errors` holds at most one message
/// because validation short-circuits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Normalized input
    pub vin: String,
    /// Whether the normalized input is a well-formed VIN
    pub is_valid: bool,
    /// Rejection reasons, in the order they were found
    pub errors: Vec<String>,
}

/// A validated, normalized VIN
///
/// Only constructible through validation, so holding a `Vin` proves the
/// format checks passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

impl Vin {
    /// Normalize and validate a raw string
    pub fn parse(raw: &str) -> Result<Self, VinValidationError> {
        let normalized = normalize_vin(raw);
        check_normalized(&normalized)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Vin {
    type Error = VinValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Vin::parse(&value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> Self {
        vin.0
    }
}

/// Uppercase and strip spaces and hyphens. Idempotent.
pub fn normalize_vin(raw: &str) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect()
}

fn check_normalized(vin: &str) -> Result<(), VinValidationError> {
    let length = vin.chars().count();
    if length != VIN_LENGTH {
        return Err(VinValidationError::WrongLength(length));
    }

    for c in vin.chars() {
        if FORBIDDEN_CHARS.contains(&c) {
            return Err(VinValidationError::ForbiddenCharacter(c));
        }
        if !VIN_CHARS.contains(c) {
            return Err(VinValidationError::InvalidCharacter(c));
        }
    }

    Ok(())
}

/// Validate a raw VIN string
///
/// # Example
/// ```
/// use fabstir_vin_node::vin::validate_vin;
///
/// let result = validate_vin("1hg-cm82633a004352");
/// assert!(result.is_valid);
/// assert_eq!(result.vin, "1HGCM82633A004352");
/// ```
pub fn validate_vin(raw: &str) -> ValidationResult {
    let vin = normalize_vin(raw);
    let errors = match check_normalized(&vin) {
        Ok(()) => Vec::new(),
        Err(e) => vec![e.to_string()],
    };

    ValidationResult {
        is_valid: errors.is_empty(),
        vin,
        errors,
    }
}
