//! Gemini REST backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use vibe_core::{defaults, Error, GenerationBackend, GenerationRequest, GenerationResponse, Result};

use super::error::{to_vibe_error, GeminiErrorCode};
use super::types::*;

/// Configuration for one Gemini model endpoint.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
    /// API key sent as `x-goog-api-key`.
    pub api_key: Option<String>,
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GEMINI_URL.to_string(),
            api_key: None,
            model: defaults::PRIMARY_MODEL.to_string(),
            timeout_seconds: defaults::GEN_TIMEOUT_SECS,
        }
    }
}

/// Gemini `generateContent` backend bound to a single model.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "gemini",
            model = %config.model,
            url = %config.base_url,
            "Initializing Gemini backend"
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build a request with authentication if configured.
    fn build_request(&self) -> reqwest::RequestBuilder {
        let mut req = self.client.post(self.endpoint());
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("x-goog-api-key", api_key);
        }
        req.header("Content-Type", "application/json")
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let start = Instant::now();
        debug!(
            subsystem = "inference",
            component = "gemini",
            model = %self.config.model,
            prompt_len = request.prompt_len(),
            thinking_budget = ?request.thinking_budget,
            "Sending generateContent request"
        );

        let body = GenerateContentRequest::from(request);
        let response = self
            .build_request()
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Request(format!("{} request failed: {}", self.config.model, e)))?;

        let status = response.status();
        if !status.is_success() {
            let (message, canonical) = match response.json::<GeminiErrorResponse>().await {
                Ok(body) => (body.error.message, body.error.status),
                Err(_) => ("Unknown error".to_string(), String::new()),
            };
            let code = GeminiErrorCode::from_response(status.as_u16(), &canonical);
            debug!(
                model = %self.config.model,
                status = status.as_u16(),
                code = ?code,
                "Gemini returned error status"
            );
            return Err(to_vibe_error(code, &self.config.model, &message));
        }

        let result: GenerateContentResponse = response.json().await.map_err(|e| {
            Error::Serialization(format!("Failed to parse Gemini response: {}", e))
        })?;

        if let Some(reason) = result
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            debug!(model = %self.config.model, block_reason = reason, "Prompt blocked");
        }

        let generation = result.into_generation_response();
        debug!(
            subsystem = "inference",
            component = "gemini",
            model = %self.config.model,
            parts = generation.parts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generation complete"
        );
        Ok(generation)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
