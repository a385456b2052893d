// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Human verification of low-confidence VIN extractions

pub mod store;

pub use store::{
    VerificationError, VerificationRecord, VerificationStats, VerificationStatus,
    VerificationStore,
};
