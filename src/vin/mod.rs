// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vehicle Identification Number handling
//!
//! Format-only validation: length and character set. The ISO 3779 check
//! digit is not computed.

pub mod validator;

pub use validator::{
    normalize_vin, validate_vin, ValidationResult, Vin, VinValidationError, FORBIDDEN_CHARS,
    VIN_CHARS, VIN_LENGTH,
};
