// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VIN region detection
//!
//! CPU-only heuristic that proposes where the VIN text line sits in a photo.

pub mod detection;
pub mod model;
pub mod preprocessing;

pub use detection::{ContourRegionDetector, DetectionConfig, RegionDetector};
pub use model::{BoundingBox, CandidateRegion, DetectionResult, RegionSource};
pub use preprocessing::{adaptive_threshold_inv, to_grayscale, RegionOfInterest};
