// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod verification;
pub mod version;
pub mod vin;
pub mod vision;

// Re-export main types
pub use config::ServiceConfig;
pub use pipeline::{ExtractionMethod, ExtractionOutcome, ExtractionPipeline, PipelineError};
pub use verification::{
    VerificationError, VerificationRecord, VerificationStatus, VerificationStore,
};
pub use vin::{validate_vin, ValidationResult, Vin};
pub use vision::{
    BoundingBox, ContourRegionDetector, DetectionResult, ExtractedText, ExtractionError,
    RegionDetector, TextExtractor, VlmTextExtractor,
};
