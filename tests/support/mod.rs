// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures for integration tests
//!
//! Deterministic detectors and extractors plus synthetic VIN plate images.

#![allow(dead_code)]

use async_trait::async_trait;
use fabstir_vin_node::vision::{
    DetectionResult, ExtractedText, ExtractionError, RegionDetector, TextExtractor,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const VALID_VIN: &str = "1HGCM82633A004352";
pub const CORRECTED_VIN: &str = "WBA3A5C51CF256651";
pub const BOUNDARY: &str = "vin-test-boundary";

/// Extractor that always returns the same reading
pub struct StaticExtractor {
    text: String,
    confidence: f32,
    calls: AtomicUsize,
}

impl StaticExtractor {
    pub fn new(text: &str, confidence: f32) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            confidence,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract(&self, _region: &DynamicImage) -> Result<ExtractedText, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExtractedText::new(self.text.clone(), self.confidence))
    }

    fn backend_name(&self) -> String {
        "static".to_string()
    }
}

/// Extractor whose backend is always down
pub struct FailingExtractor;

#[async_trait]
impl TextExtractor for FailingExtractor {
    async fn extract(&self, _region: &DynamicImage) -> Result<ExtractedText, ExtractionError> {
        Err(ExtractionError::Request("connection refused".to_string()))
    }

    fn backend_name(&self) -> String {
        "failing".to_string()
    }
}

/// Detector that returns a preset result
pub struct FixedDetector(pub DetectionResult);

impl RegionDetector for FixedDetector {
    fn detect(&self, _image: &DynamicImage) -> DetectionResult {
        self.0.clone()
    }
}

/// 1000x500 white image with one dark text-line bar
///
/// The default detector finds the bar at [400, 380, 600, 400] with
/// confidence 0.74.
pub fn plate_image() -> RgbImage {
    image_with_bar(400, 380, 200, 20)
}

/// 1000x500 white image whose bar scores above the confidence cap (0.85)
pub fn large_plate_image() -> RgbImage {
    image_with_bar(300, 360, 400, 40)
}

pub fn blank_image() -> RgbImage {
    RgbImage::from_pixel(1000, 500, Rgb([255, 255, 255]))
}

fn image_with_bar(x: u32, y: u32, width: u32, height: u32) -> RgbImage {
    let mut img = blank_image();
    for py in y..y + height {
        for px in x..x + width {
            img.put_pixel(px, py, Rgb([20, 20, 20]));
        }
    }
    img
}

pub fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn png_bytes(img: RgbImage) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

/// Hand-built multipart/form-data body using [`BOUNDARY`]
pub fn multipart_body(file: Option<&[u8]>, require_verification: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(flag) = require_verification {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"require_verification\"\r\n\r\n{}\r\n",
                BOUNDARY, flag
            )
            .as_bytes(),
        );
    }

    if let Some(bytes) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"vin.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
