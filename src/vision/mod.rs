// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for VIN extraction
//!
//! This module provides:
//! - CPU-based VIN region detection (contour heuristics)
//! - The text extraction interface and a VLM sidecar backend
//!
//! Region detection needs no model weights; reading characters is delegated
//! to whichever [`TextExtractor`] the node is started with.

pub mod image_utils;
pub mod recognition;
pub mod region;
pub mod vlm_client;

pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use recognition::{contrast_confidence, ExtractedText, ExtractionError, TextExtractor};
pub use region::{
    BoundingBox, ContourRegionDetector, DetectionConfig, DetectionResult, RegionDetector,
    RegionSource,
};
pub use vlm_client::VlmTextExtractor;
