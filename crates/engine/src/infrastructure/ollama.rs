//! Ollama LLM client (native streaming generate API)

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::infrastructure::ndjson;
use crate::infrastructure::ports::{LlmError, LlmStreamPort, TokenStream};

/// Client for Ollama's `/api/generate` endpoint
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Default model for Ollama.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

impl OllamaClient {
    /// No request timeout: a generation streams for as long as the backend keeps writing.
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL)
    }
}

#[async_trait]
impl LlmStreamPort for OllamaClient {
    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream, LlmError> {
        let api_request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&api_request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!(
                "Ollama returned {status}: {error_text}"
            )));
        }

        tracing::debug!(model = %self.model, "Ollama stream opened");
        Ok(Box::pin(ndjson::token_stream(response.bytes_stream())))
    }
}

// =============================================================================
// Ollama API types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}
