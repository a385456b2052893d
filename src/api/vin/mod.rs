// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VIN API endpoint module
//!
//! Provides extraction, verification and validation under /api/vin.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{
    extract_handler, get_verification_handler, validate_handler, verification_stats_handler,
    verify_handler,
};
pub use request::{ExtractRequest, ValidateRequest, VerifyRequest};
pub use response::{ExtractResponse, VerifyResponse};
