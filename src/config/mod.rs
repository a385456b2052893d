// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Loaded from environment variables (after `.env` has been applied by the
//! binaries). Unset or unparsable values fall back to the defaults.

use std::env;
use std::net::SocketAddr;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 10000;
/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Combined confidence below which opted-in extractions need review
pub const DEFAULT_VERIFICATION_THRESHOLD: f32 = 0.75;
/// Default model name requested from the VLM sidecar
pub const DEFAULT_VLM_MODEL: &str = "qwen3-vl";

/// Configuration for the VIN extraction service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: String,
    /// HTTP port (default: 10000)
    pub port: u16,
    /// Verification threshold (default: 0.75)
    pub verification_threshold: f32,
    /// VLM sidecar base URL; extraction is unavailable without it
    pub vlm_endpoint: Option<String>,
    /// VLM model name (default: qwen3-vl)
    pub vlm_model: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            verification_threshold: env::var("VERIFICATION_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_VERIFICATION_THRESHOLD),
            vlm_endpoint: env::var("VLM_ENDPOINT")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            vlm_model: env::var("VLM_MODEL").unwrap_or_else(|_| DEFAULT_VLM_MODEL.to_string()),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.verification_threshold) {
            return Err(format!(
                "verification_threshold must be within [0, 1], got {}",
                self.verification_threshold
            ));
        }
        if self.vlm_model.trim().is_empty() {
            return Err("vlm_model must not be empty".to_string());
        }
        if let Some(endpoint) = &self.vlm_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("vlm_endpoint must be an http(s) URL, got {}", endpoint));
            }
        }
        Ok(())
    }

    /// Socket address to bind the HTTP server to
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            verification_threshold: DEFAULT_VERIFICATION_THRESHOLD,
            vlm_endpoint: None,
            vlm_model: DEFAULT_VLM_MODEL.to_string(),
        }
    }
}
