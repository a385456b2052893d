// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for VIN region detection

use image::{imageops, DynamicImage, GrayImage, Luma};
use imageproc::filter::separable_filter_equal;

use super::detection::DetectionConfig;

/// Foreground value in binarized images
pub const FOREGROUND: u8 = 255;

/// Sub-rectangle of the image searched for candidate text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionOfInterest {
    pub x_start: u32,
    pub y_start: u32,
    pub x_end: u32,
    pub y_end: u32,
}

impl RegionOfInterest {
    /// Compute the search band for an image of the given size
    ///
    /// Fractions are truncated to whole pixels.
    pub fn compute(width: u32, height: u32, config: &DetectionConfig) -> Self {
        Self {
            x_start: fraction_of(width, config.roi_left),
            y_start: fraction_of(height, config.roi_top),
            x_end: fraction_of(width, config.roi_right),
            y_end: fraction_of(height, config.roi_bottom),
        }
    }

    pub fn width(&self) -> u32 {
        self.x_end.saturating_sub(self.x_start)
    }

    pub fn height(&self) -> u32 {
        self.y_end.saturating_sub(self.y_start)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// `floor(value * fraction)`, clamped to `value`
pub fn fraction_of(value: u32, fraction: f64) -> u32 {
    ((value as f64 * fraction) as u32).min(value)
}

/// Rec.601 luma weights in 14-bit fixed point (R, G, B)
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Convert to 8-bit grayscale; grayscale input is copied as-is
///
/// Color input uses Rec.601 weights (0.299, 0.587, 0.114) with rounding.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => {
            let rgb = other.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                Luma([luma_601(r, g, b)])
            })
        }
    }
}

pub fn luma_601(r: u8, g: u8, b: u8) -> u8 {
    let weighted = r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B;
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT).min(255) as u8
}

/// Crop the region of interest out of a grayscale image
pub fn crop_roi(gray: &GrayImage, roi: &RegionOfInterest) -> GrayImage {
    imageops::crop_imm(gray, roi.x_start, roi.y_start, roi.width(), roi.height()).to_image()
}

/// Gaussian sigma equivalent to a square block of the given size
pub fn block_sigma(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized Gaussian kernel with exactly `block_size` taps
///
/// Even sizes are bumped to the next odd size.
pub fn gaussian_kernel(block_size: u32) -> Vec<f32> {
    let size = block_size.max(3) | 1;
    let sigma = block_sigma(size);
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Inverted Gaussian-weighted adaptive threshold
///
/// A pixel becomes foreground when it is at least `offset` darker than the
/// rounded Gaussian-weighted mean of its `block_size` x `block_size`
/// neighbourhood, so dark strokes on a light plate come out white. Edges
/// replicate the border pixel.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let kernel = gaussian_kernel(block_size);
    let local_mean = separable_filter_equal(gray, &kernel);

    GrayImage::from_fn(width, height, |x, y| {
        let value = gray.get_pixel(x, y)[0] as f32;
        let mean = (local_mean.get_pixel(x, y)[0] as f32).round();
        if value <= mean - offset {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}
