// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir VIN Node

/// Full version string with feature description
pub const VERSION: &str = "v2.0.0-vin-extraction-2025-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = "2.0.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 2;

/// Minor version number
pub const VERSION_MINOR: u32 = 0;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-10-19";

/// Service name reported by the index endpoint
pub const SERVICE_NAME: &str = "VIN Extraction API";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "vin-validation",
    "contour-region-detection",
    "fallback-region",
    "vlm-text-extraction",
    "human-verification",
    "multipart-upload",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir VIN Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
