// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction interface for cropped VIN regions
//!
//! Character recognition is an external capability. The pipeline only sees
//! the [`TextExtractor`] trait, so backends can be swapped and tests can use
//! deterministic fakes.

use async_trait::async_trait;
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::image_utils::ImageError;

/// Base confidence reported for any readable crop
pub const CONTRAST_CONFIDENCE_BASE: f32 = 0.70;
/// Weight of normalized contrast added to the base
pub const CONTRAST_CONFIDENCE_SCALE: f32 = 0.25;
/// Upper bound for contrast-derived confidence
pub const CONTRAST_CONFIDENCE_CAP: f32 = 0.95;

/// Candidate text read from a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Raw candidate, not yet normalized or validated
    pub text: String,
    /// Extractor confidence in [0, 1]
    pub confidence: f32,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Failures reported by a text extraction backend
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to prepare region image: {0}")]
    Image(#[from] ImageError),

    #[error("Extractor request failed: {0}")]
    Request(String),

    #[error("Extractor returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Malformed extractor response: {0}")]
    InvalidResponse(String),
}

/// Reads a candidate VIN string from a cropped region
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, region: &DynamicImage) -> Result<ExtractedText, ExtractionError>;

    /// Backend label for logs and the model info endpoint
    fn backend_name(&self) -> String;
}

/// Contrast heuristic: `min(0.70 + stddev / 255 * 0.25, 0.95)`
///
/// Uses the population standard deviation of the grayscale intensities.
/// An empty image reports the base value.
pub fn contrast_confidence(gray: &GrayImage) -> f32 {
    let count = gray.as_raw().len();
    if count == 0 {
        return CONTRAST_CONFIDENCE_BASE;
    }

    let n = count as f64;
    let mean = gray.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = gray
        .as_raw()
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt() as f32;

    (CONTRAST_CONFIDENCE_BASE + (std_dev / 255.0) * CONTRAST_CONFIDENCE_SCALE)
        .min(CONTRAST_CONFIDENCE_CAP)
}
