// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VIN extraction pipeline
//!
//! Detector -> extractor -> validator, then the verification gate:
//! 1. Decode and normalize the image to RGB
//! 2. Propose a region; stop with no VIN when nothing is found
//! 3. Crop and read the region
//! 4. Validate the text; invalid text reports the extractor's own confidence
//! 5. Combine confidences multiplicatively and open a verification record
//!    when the caller asked for review and the result is below threshold

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DEFAULT_VERIFICATION_THRESHOLD;
use crate::verification::VerificationStore;
use crate::vin::Vin;
use crate::vision::image_utils::{decode_image_bytes, normalize_to_rgb, ImageError};
use crate::vision::recognition::{ExtractionError, TextExtractor};
use crate::vision::region::{BoundingBox, DetectionResult, RegionDetector, RegionSource};

pub const MSG_NO_REGION: &str = "No VIN region detected";
pub const MSG_NOT_RECOGNIZED: &str = "VIN region found but text not recognized";
pub const MSG_EXTRACTED: &str = "VIN extracted successfully";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid image: {0}")]
    InvalidImage(#[from] ImageError),

    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// How the reported result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// No region was searched for text
    None,
    /// Text was read from a detected region
    Ocr,
}

/// Result of a single extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub has_vin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<Vin>,
    /// Combined confidence for a valid VIN, extractor confidence otherwise
    pub confidence: f32,
    pub method: ExtractionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    pub processing_time_ms: u64,
    pub needs_verification: bool,
    pub verification_id: Option<Uuid>,
    pub message: String,
}

impl ExtractionOutcome {
    fn no_region(processing_time_ms: u64) -> Self {
        Self {
            has_vin: false,
            vin: None,
            confidence: 0.0,
            method: ExtractionMethod::None,
            bbox: None,
            processing_time_ms,
            needs_verification: false,
            verification_id: None,
            message: MSG_NO_REGION.to_string(),
        }
    }

    fn not_recognized(bbox: BoundingBox, confidence: f32, processing_time_ms: u64) -> Self {
        Self {
            has_vin: false,
            vin: None,
            confidence,
            method: ExtractionMethod::Ocr,
            bbox: Some(bbox),
            processing_time_ms,
            needs_verification: false,
            verification_id: None,
            message: MSG_NOT_RECOGNIZED.to_string(),
        }
    }
}

/// Runs region detection, text extraction and validation for one image
pub struct ExtractionPipeline {
    detector: Arc<dyn RegionDetector>,
    extractor: Arc<dyn TextExtractor>,
    store: Arc<VerificationStore>,
    verification_threshold: f32,
}

impl ExtractionPipeline {
    pub fn new(
        detector: Arc<dyn RegionDetector>,
        extractor: Arc<dyn TextExtractor>,
        store: Arc<VerificationStore>,
    ) -> Self {
        Self {
            detector,
            extractor,
            store,
            verification_threshold: DEFAULT_VERIFICATION_THRESHOLD,
        }
    }

    pub fn with_verification_threshold(mut self, threshold: f32) -> Self {
        self.verification_threshold = threshold;
        self
    }

    pub fn verification_threshold(&self) -> f32 {
        self.verification_threshold
    }

    pub fn detector(&self) -> &dyn RegionDetector {
        self.detector.as_ref()
    }

    pub fn extractor(&self) -> &dyn TextExtractor {
        self.extractor.as_ref()
    }

    pub fn store(&self) -> &Arc<VerificationStore> {
        &self.store
    }

    /// Extract a VIN from encoded image bytes
    pub async fn extract_vin(
        &self,
        image_bytes: &[u8],
        require_verification: bool,
    ) -> Result<ExtractionOutcome, PipelineError> {
        let start = Instant::now();

        let (image, info) = decode_image_bytes(image_bytes)?;
        debug!(
            "Decoded {:?} image: {}x{}, {} bytes",
            info.format, info.width, info.height, info.size_bytes
        );
        let image = normalize_to_rgb(image);

        self.extract_from_image(&image, require_verification, start)
            .await
    }

    /// Extract a VIN from an already decoded image
    pub async fn extract_vin_from_image(
        &self,
        image: &DynamicImage,
        require_verification: bool,
    ) -> Result<ExtractionOutcome, PipelineError> {
        let image = normalize_to_rgb(image.clone());
        self.extract_from_image(&image, require_verification, Instant::now())
            .await
    }

    async fn extract_from_image(
        &self,
        image: &DynamicImage,
        require_verification: bool,
        start: Instant,
    ) -> Result<ExtractionOutcome, PipelineError> {
        let detection = self.detector.detect(image);
        let bbox = match region_of(&detection) {
            Some(bbox) => bbox,
            None => {
                info!("No VIN region detected in {}ms", elapsed_ms(start));
                return Ok(ExtractionOutcome::no_region(elapsed_ms(start)));
            }
        };

        if !bbox.fits_within(image.width(), image.height()) {
            return Err(PipelineError::Internal(format!(
                "detector returned {:?} outside {}x{} image",
                bbox.to_array(),
                image.width(),
                image.height()
            )));
        }

        if bbox.is_empty() {
            debug!("Degenerate region {:?}, skipping extraction", bbox.to_array());
            return Ok(ExtractionOutcome::not_recognized(bbox, 0.0, elapsed_ms(start)));
        }

        let region = image.crop_imm(bbox.x1, bbox.y1, bbox.width(), bbox.height());
        let extracted = self.extractor.extract(&region).await?;

        let vin = match Vin::parse(&extracted.text) {
            Ok(vin) => vin,
            Err(e) => {
                info!(
                    "Region {:?} ({:?}) text rejected: {}",
                    bbox.to_array(),
                    detection.source,
                    e
                );
                return Ok(ExtractionOutcome::not_recognized(
                    bbox,
                    extracted.confidence,
                    elapsed_ms(start),
                ));
            }
        };

        let confidence = extracted.confidence * detection.confidence;
        let needs_verification = require_verification && confidence < self.verification_threshold;
        let verification_id = if needs_verification {
            Some(self.store.create(&vin, confidence).await)
        } else {
            None
        };

        info!(
            "Extracted VIN {} from {:?} region: detection {:.3}, extraction {:.3}, combined {:.3}, verification {}, {}ms",
            vin,
            detection.source,
            detection.confidence,
            extracted.confidence,
            confidence,
            needs_verification,
            elapsed_ms(start)
        );

        Ok(ExtractionOutcome {
            has_vin: true,
            vin: Some(vin),
            confidence,
            method: ExtractionMethod::Ocr,
            bbox: Some(bbox),
            processing_time_ms: elapsed_ms(start),
            needs_verification,
            verification_id,
            message: MSG_EXTRACTED.to_string(),
        })
    }
}

fn region_of(detection: &DetectionResult) -> Option<BoundingBox> {
    if !detection.found || detection.source == RegionSource::None {
        return None;
    }
    detection.bbox
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
