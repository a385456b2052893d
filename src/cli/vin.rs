// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{DEFAULT_VERIFICATION_THRESHOLD, DEFAULT_VLM_MODEL};
use crate::pipeline::{ExtractionOutcome, ExtractionPipeline};
use crate::verification::VerificationStore;
use crate::vin::{validate_vin, ValidationResult};
use crate::vision::image_utils::{decode_image_bytes, normalize_to_rgb};
use crate::vision::{ContourRegionDetector, DetectionResult, RegionDetector, VlmTextExtractor};

/// Arguments for validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// VINs to check (spaces and hyphens are ignored)
    #[arg(required = true)]
    pub vins: Vec<String>,
}

/// Arguments for detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Image file to search
    pub image: PathBuf,
}

/// Arguments for extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Image file to read the VIN from
    pub image: PathBuf,

    /// VLM sidecar base URL (can also be set via VLM_ENDPOINT env var)
    #[arg(long, env = "VLM_ENDPOINT")]
    pub vlm_endpoint: String,

    /// Model name requested from the sidecar
    #[arg(long, env = "VLM_MODEL", default_value = DEFAULT_VLM_MODEL)]
    pub vlm_model: String,

    /// Open a verification record for low-confidence results
    #[arg(long)]
    pub require_verification: bool,

    /// Combined confidence below which verification is required
    #[arg(long, default_value_t = DEFAULT_VERIFICATION_THRESHOLD)]
    pub threshold: f32,
}

/// Validate each VIN
pub fn validate_all(vins: &[String]) -> Vec<ValidationResult> {
    vins.iter().map(|vin| validate_vin(vin)).collect()
}

/// Print validation results; fails when any VIN is invalid
pub async fn validate(args: ValidateArgs) -> Result<()> {
    let results = validate_all(&args.vins);
    for result in &results {
        println!("{}", serde_json::to_string(result)?);
    }

    let invalid = results.iter().filter(|r| !r.is_valid).count();
    if invalid > 0 {
        return Err(anyhow!("{} of {} VINs invalid", invalid, results.len()));
    }
    Ok(())
}

/// Run region detection on an image file
pub async fn detect_file(path: &Path) -> Result<DetectionResult> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (image, info) = decode_image_bytes(&bytes)?;
    info!("Loaded {}: {}x{}", path.display(), info.width, info.height);

    let detector = ContourRegionDetector::default();
    Ok(detector.detect(&normalize_to_rgb(image)))
}

pub async fn detect(args: DetectArgs) -> Result<()> {
    let result = detect_file(&args.image).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Run the full pipeline on an image file against an in-process store
pub async fn extract_file(args: &ExtractArgs) -> Result<ExtractionOutcome> {
    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;

    let extractor = VlmTextExtractor::new(&args.vlm_endpoint, &args.vlm_model)?;
    if !extractor.health_check().await {
        warn!("VLM sidecar at {} is not reporting healthy", extractor.endpoint());
    }
    let pipeline = ExtractionPipeline::new(
        Arc::new(ContourRegionDetector::default()),
        Arc::new(extractor),
        Arc::new(VerificationStore::new()),
    )
    .with_verification_threshold(args.threshold);

    let outcome = pipeline
        .extract_vin(&bytes, args.require_verification)
        .await?;
    Ok(outcome)
}

pub async fn extract(args: ExtractArgs) -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let outcome = extract_file(&args).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
