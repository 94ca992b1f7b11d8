//! Generation backend — the single point of entry for all LLM calls in Hirelens.
//!
//! ARCHITECTURAL RULE: No other module may call the text-generation service
//! directly. All LLM interactions MUST go through `GenerationBackend`.
//!
//! The pipeline holds an `Arc<dyn GenerationBackend>` so tests can substitute
//! scripted fakes without touching stage code.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const GENERATE_PATH: &str = "/api/generate";
const MAX_RETRIES: u32 = 3;
/// Hard cap on one generate call. A backend that never answers must become an
/// error and the run's failure branch, never an indefinite stall.
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Backend unavailable after {retries} retries")]
    Unavailable { retries: u32 },

    #[error("Backend returned empty content")]
    EmptyContent,
}

/// The external text-generation service, seen as a single opaque operation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Sends one prompt and returns the raw completion text.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Production backend: a local Ollama instance.
/// Wraps `/api/generate` with a request timeout and bounded retry logic.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    /// Makes one generate call. Retries on transport errors, 429, and 5xx
    /// with exponential backoff.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let url = format!("{}{}", self.base_url, GENERATE_PATH);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Generate call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self.client.post(&url).json(&request_body).send().await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Generation backend returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let ollama_response: OllamaResponse = response.json().await?;

            if ollama_response.response.trim().is_empty() {
                return Err(LlmError::EmptyContent);
            }

            debug!(
                "Generate call succeeded: {} chars returned",
                ollama_response.response.len()
            );

            return Ok(ollama_response.response);
        }

        Err(last_error.unwrap_or(LlmError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }
}
