//! Ollama client for text generation.
//!
//! Every agent funnels its prompts through the `TextGenerator` trait,
//! so tests can script responses without a live model server.

use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Per-call generation parameters.
///
/// Each agent picks its own temperature and token budget.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 4096,
        }
    }
}

/// Opaque `prompt in, text out` capability backing every agent.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, LlmError>;
}

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub timeout_seconds: u64,
    /// Extra attempts when the server is unreachable.
    pub retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            timeout_seconds: 120,
            retries: 2,
        }
    }
}

/// Ollama generate API request.
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama generate API response.
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// HTTP client for the Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    config: LlmConfig,
    http_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    async fn request(&self, prompt: &str, options: GenerateOptions) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.ollama_url);

        let request = OllamaGenerateRequest {
            model: &self.config.model_name,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        debug!(
            "Sending generate request to {} ({} prompt chars)",
            url,
            prompt.len()
        );

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    LlmError::Connect(self.config.ollama_url.clone())
                } else {
                    LlmError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let generate_response: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        Ok(generate_response.response)
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            match self.request(prompt, options).await {
                // Only connection refusals are retried. Timeouts and
                // API errors surface immediately.
                Err(LlmError::Connect(url)) if attempt < self.config.retries => {
                    attempt += 1;
                    warn!(
                        "Cannot connect to Ollama at {}, retrying ({}/{})",
                        url, attempt, self.config.retries
                    );
                    tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
                }
                other => return other,
            }
        }
    }
}
