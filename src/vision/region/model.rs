// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Region detection result types

use serde::{Deserialize, Serialize};

/// Axis-aligned box in source-image pixel coordinates
///
/// `x2`/`y2` are exclusive, so `width = x2 - x1`. Serialized as
/// `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from a top-left corner and a size
    pub fn from_origin_size(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// True when the box covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Check that the box lies within an image of the given size
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2 && self.x2 <= width && self.y2 <= height
    }

    pub fn to_array(&self) -> [u32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl From<[u32; 4]> for BoundingBox {
    fn from(value: [u32; 4]) -> Self {
        Self::new(value[0], value[1], value[2], value[3])
    }
}

impl From<BoundingBox> for [u32; 4] {
    fn from(value: BoundingBox) -> Self {
        value.to_array()
    }
}

/// Where a detection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSource {
    /// A contour passed the geometric filters
    Contour,
    /// No contour qualified; the default lower-middle box was used
    Fallback,
    /// Nothing to search (empty region of interest)
    None,
}

/// Result of VIN region detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Whether a region was proposed
    pub found: bool,
    /// Proposed region, always within image bounds
    pub bbox: Option<BoundingBox>,
    /// Detection confidence in [0, 1)
    pub confidence: f32,
    /// How the region was obtained
    pub source: RegionSource,
}

impl DetectionResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            bbox: None,
            confidence: 0.0,
            source: RegionSource::None,
        }
    }

    pub fn from_contour(bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            found: true,
            bbox: Some(bbox),
            confidence,
            source: RegionSource::Contour,
        }
    }

    pub fn from_fallback(bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            found: true,
            bbox: Some(bbox),
            confidence,
            source: RegionSource::Fallback,
        }
    }
}

/// Bounding rectangle of a contour, in region-of-interest coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CandidateRegion {
    /// Width over height; zero-height candidates report 0
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Ranking score: favors large, elongated text lines
    pub fn score(&self) -> f64 {
        self.area() as f64 * self.aspect_ratio()
    }
}
