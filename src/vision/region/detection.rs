// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Contour-based VIN region detection
//!
//! Searches a band in the lower-middle of the image, where dashboard and
//! door-jamb VIN plates usually sit in cropped photos, for an elongated
//! dark-on-light text line. When nothing qualifies a fixed default box is
//! proposed instead, so detection only fails outright when the search band
//! is empty.

use image::DynamicImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use tracing::debug;

use super::model::{BoundingBox, CandidateRegion, DetectionResult};
use super::preprocessing::{
    adaptive_threshold_inv, crop_roi, fraction_of, to_grayscale, RegionOfInterest,
};

/// Tunable constants for [`ContourRegionDetector`]
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Top of the search band as a fraction of image height
    pub roi_top: f64,
    /// Bottom of the search band as a fraction of image height
    pub roi_bottom: f64,
    /// Left edge of the search band as a fraction of image width
    pub roi_left: f64,
    /// Right edge of the search band as a fraction of image width
    pub roi_right: f64,
    /// Adaptive threshold neighbourhood size (odd)
    pub block_size: u32,
    /// Subtracted from the local mean before comparison
    pub threshold_offset: f32,
    pub min_width: u32,
    pub min_height: u32,
    /// Exclusive lower bound on width / height
    pub min_aspect_ratio: f64,
    /// Exclusive upper bound on width / height
    pub max_aspect_ratio: f64,
    /// Exclusive lower bound on width * height
    pub min_area: u64,
    pub confidence_base: f64,
    pub confidence_scale: f64,
    pub confidence_cap: f64,
    pub fallback_width: f64,
    pub fallback_height: f64,
    pub fallback_top: f64,
    pub fallback_confidence: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            roi_top: 0.65,
            roi_bottom: 0.90,
            roi_left: 0.15,
            roi_right: 0.85,
            block_size: 11,
            threshold_offset: 2.0,
            min_width: 50,
            min_height: 15,
            min_aspect_ratio: 4.0,
            max_aspect_ratio: 20.0,
            min_area: 1500,
            confidence_base: 0.5,
            confidence_scale: 3.0,
            confidence_cap: 0.85,
            fallback_width: 0.5,
            fallback_height: 0.08,
            fallback_top: 0.78,
            fallback_confidence: 0.35,
        }
    }
}

/// Proposes the image region most likely to contain a VIN
pub trait RegionDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> DetectionResult;

    /// Short label reported by the model info endpoint
    fn name(&self) -> &'static str {
        "region-detector"
    }
}

/// Heuristic detector built on adaptive thresholding and contour geometry
#[derive(Debug, Clone, Default)]
pub struct ContourRegionDetector {
    config: DetectionConfig,
}

impl ContourRegionDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Geometric filter applied to every contour rectangle
    pub fn accept_candidate(&self, candidate: &CandidateRegion) -> bool {
        if candidate.height == 0
            || candidate.width < self.config.min_width
            || candidate.height < self.config.min_height
        {
            return false;
        }

        let aspect = candidate.aspect_ratio();
        aspect > self.config.min_aspect_ratio
            && aspect < self.config.max_aspect_ratio
            && candidate.area() > self.config.min_area
    }

    /// Confidence for a winning candidate, relative to the full image area
    pub fn detection_confidence(&self, score: f64, width: u32, height: u32) -> f32 {
        let image_area = width as f64 * height as f64;
        if image_area == 0.0 {
            return 0.0;
        }
        let raw = self.config.confidence_base + (score / image_area) * self.config.confidence_scale;
        raw.min(self.config.confidence_cap) as f32
    }

    /// Default box: half the width, centered, starting at 78% of the height
    ///
    /// Depends only on the image dimensions and is clamped to them.
    pub fn fallback_region(&self, width: u32, height: u32) -> BoundingBox {
        let box_width = fraction_of(width, self.config.fallback_width);
        let box_height = fraction_of(height, self.config.fallback_height);
        let x = (width - box_width) / 2;
        let y = fraction_of(height, self.config.fallback_top);

        BoundingBox::new(
            x,
            y,
            (x + box_width).min(width),
            (y + box_height).min(height),
        )
    }

    /// Best accepted candidate in ROI-local coordinates, with its score
    fn best_candidate(&self, contours: &[Contour<u32>]) -> Option<(CandidateRegion, f64)> {
        let mut best: Option<(CandidateRegion, f64)> = None;

        for contour in contours.iter().filter(|c| is_external(c)) {
            let Some(candidate) = bounding_rect(contour) else {
                continue;
            };
            if !self.accept_candidate(&candidate) {
                continue;
            }

            let score = candidate.score();
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        best
    }
}

impl RegionDetector for ContourRegionDetector {
    fn detect(&self, image: &DynamicImage) -> DetectionResult {
        let (width, height) = (image.width(), image.height());
        let roi = RegionOfInterest::compute(width, height, &self.config);
        if roi.is_empty() {
            debug!("Empty search band for {}x{} image", width, height);
            return DetectionResult::not_found();
        }

        let gray = to_grayscale(image);
        let band = crop_roi(&gray, &roi);
        let binary =
            adaptive_threshold_inv(&band, self.config.block_size, self.config.threshold_offset);
        let contours = find_contours::<u32>(&binary);

        match self.best_candidate(&contours) {
            Some((candidate, score)) => {
                let bbox = BoundingBox::from_origin_size(
                    roi.x_start + candidate.x,
                    roi.y_start + candidate.y,
                    candidate.width,
                    candidate.height,
                );
                let confidence = self.detection_confidence(score, width, height);
                debug!(
                    "VIN region from {} contours: {:?} (confidence {:.3})",
                    contours.len(),
                    bbox.to_array(),
                    confidence
                );
                DetectionResult::from_contour(bbox, confidence)
            }
            None => {
                let bbox = self.fallback_region(width, height);
                debug!(
                    "No contour qualified out of {}, using fallback {:?}",
                    contours.len(),
                    bbox.to_array()
                );
                DetectionResult::from_fallback(bbox, self.config.fallback_confidence)
            }
        }
    }

    fn name(&self) -> &'static str {
        "contour-heuristic"
    }
}

/// Top-level outer border; holes and anything nested inside them are skipped
fn is_external(contour: &Contour<u32>) -> bool {
    contour.border_type == BorderType::Outer && contour.parent.is_none()
}

/// Inclusive axis-aligned bounding rectangle of a contour
fn bounding_rect(contour: &Contour<u32>) -> Option<CandidateRegion> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

    for point in &contour.points[1..] {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Some(CandidateRegion {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}
