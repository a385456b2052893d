// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VLM sidecar text extractor via OpenAI-compatible API

use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::image_utils::encode_png_base64;
use super::recognition::{contrast_confidence, ExtractedText, ExtractionError, TextExtractor};
use super::region::to_grayscale;

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: String,
}

const VIN_PROMPT: &str = "This image shows the area of a vehicle document or plate where the Vehicle Identification Number (VIN) is printed. Read the 17-character VIN and reply with the VIN only, on a single line, without spaces or any other text. If no VIN is legible, reply with an empty string.";

/// Label some models prefix to their answer
const VIN_LABEL: &str = "VIN:";

/// Text extractor backed by a vision-language model sidecar
pub struct VlmTextExtractor {
    client: Client,
    endpoint: String,
    model_name: String,
}

impl VlmTextExtractor {
    /// Create a new VLM extractor
    pub fn new(endpoint: &str, model_name: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "VLM text extractor configured: endpoint={}, model={}",
            endpoint, model_name
        );

        Ok(Self {
            client,
            endpoint,
            model_name: model_name.to_string(),
        })
    }

    /// Get the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if the VLM sidecar is healthy
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("VLM health check failed: {}", e);
                false
            }
        }
    }

    fn build_request(&self, base64_png: &str) -> ChatRequest {
        let data_url = format!("data:image/png;base64,{}", base64_png);
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": VIN_PROMPT},
                    {"type": "image_url", "image_url": {"url": data_url}}
                ]),
            }],
            max_tokens: 64,
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl TextExtractor for VlmTextExtractor {
    async fn extract(&self, region: &DynamicImage) -> Result<ExtractedText, ExtractionError> {
        let start = std::time::Instant::now();
        let base64_png = encode_png_base64(region)?;
        let request = self.build_request(&base64_png);

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("VLM sidecar returned {}: {}", status, body);
            return Err(ExtractionError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::InvalidResponse(e.to_string()))?;
        let reply = chat_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ExtractionError::InvalidResponse("no choices in reply".to_string()))?;

        let text = parse_vin_reply(reply);
        let confidence = contrast_confidence(&to_grayscale(region));
        let tokens_used = chat_response.usage.map(|u| u.total_tokens).unwrap_or(0);

        debug!(
            "VLM read {:?} in {}ms ({} tokens, confidence {:.3})",
            text,
            start.elapsed().as_millis(),
            tokens_used,
            confidence
        );

        Ok(ExtractedText::new(text, confidence))
    }

    fn backend_name(&self) -> String {
        format!("vlm:{}", self.model_name)
    }
}

/// Reduce a free-form model reply to a single VIN candidate
///
/// Keeps the first non-empty line, drops a leading `VIN:` label and trims
/// quotes, backticks and trailing punctuation.
pub fn parse_vin_reply(reply: &str) -> String {
    let Some(line) = reply.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return String::new();
    };

    let trim_chars: &[char] = &['"', '\'', '`', '*', '.', ',', ';', ':'];
    let mut candidate = line.trim_matches(trim_chars).trim();

    if candidate.len() >= VIN_LABEL.len()
        && candidate.is_char_boundary(VIN_LABEL.len())
        && candidate[..VIN_LABEL.len()].eq_ignore_ascii_case(VIN_LABEL)
    {
        candidate = candidate[VIN_LABEL.len()..]
            .trim()
            .trim_matches(trim_chars)
            .trim();
    }

    candidate.to_string()
}
