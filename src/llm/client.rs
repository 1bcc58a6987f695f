use std::future::Future;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One request to the generative capability.
///
/// Temperature and token ceiling are stage configuration, fixed per stage,
/// never negotiated at runtime.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Failure of a single generate call.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request to generative API failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generative API error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("no text content in response")]
    Empty,
}

/// Markers that classify a failure as a rate-limit/quota signal.
///
/// Substring matching on error text is a known fragility; the upstream API
/// does not expose a structured retry-after, so the marker set is kept
/// narrow and enumerated in one place.
const THROTTLE_MARKERS: [&str; 4] = ["429", "quota", "rate limit", "resource_exhausted"];

/// True when a recorded failure reason indicates the request-rate ceiling was hit.
pub fn is_throttle_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    THROTTLE_MARKERS.iter().any(|m| lowered.contains(m))
}

/// The generative capability boundary.
///
/// The pipeline is generic over this trait so tests can substitute a
/// deterministic scripted generator for the live API client.
pub trait Generate {
    fn generate(
        &self,
        request: GenerateRequest<'_>,
    ) -> impl Future<Output = Result<String, GenerateError>> + Send;
}

/// Configuration for the Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (from GOOGLE_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "gemini-2.0-flash-lite")
    pub model: String,
}

impl GeminiConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .context("GOOGLE_API_KEY environment variable not set")?;

        Ok(Self {
            api_key,
            // flash-lite has the higher request-per-minute ceiling (30 RPM)
            model: "gemini-2.0-flash-lite".to_string(),
        })
    }

    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }
}

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    async fn send(&self, request: GenerateRequest<'_>) -> Result<String, GenerateError> {
        let body = GeminiRequest {
            system_instruction: (!request.system.is_empty()).then(|| Content {
                role: None,
                parts: vec![Part {
                    text: request.system.to_string(),
                }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.config.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Api { status, body });
        }

        let response: GeminiResponse = response.json().await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or(GenerateError::Empty)
    }
}

impl Generate for GeminiClient {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<String, GenerateError> {
        self.send(request).await
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_markers() {
        assert!(is_throttle_message("generative API error: 429 - too many requests"));
        assert!(is_throttle_message("Quota exceeded for model"));
        assert!(is_throttle_message("RESOURCE_EXHAUSTED"));
        assert!(is_throttle_message("hit the rate limit, slow down"));
    }

    #[test]
    fn test_non_throttle_messages() {
        assert!(!is_throttle_message("generative API error: 500 - internal"));
        assert!(!is_throttle_message("no text content in response"));
        assert!(!is_throttle_message("connection reset by peer"));
    }
}
