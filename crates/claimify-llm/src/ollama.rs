//! Ollama Gateway Implementation
//!
//! Provides integration with Ollama's local chat API, so the pipeline can run
//! entirely against a local model.
//!
//! # Features
//!
//! - Async HTTP communication with the `/api/chat` endpoint
//! - System and user prompts sent as separate chat messages
//! - Retry logic with exponential backoff
//! - Per-request timeout
//!
//! # Examples
//!
//! ```no_run
//! use claimify_llm::OllamaGateway;
//!
//! let gateway = OllamaGateway::new("http://localhost:11434", "llama3")?;
//! # Ok::<(), claimify_llm::LlmError>(())
//! ```

use crate::retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
use crate::LlmError;
use async_trait::async_trait;
use claimify_domain::CompletionGateway;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ollama chat gateway for local LLM inference
#[derive(Debug, Clone)]
pub struct OllamaGateway {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    retry: RetryPolicy,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct OllamaReplyMessage {
    content: String,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaReplyMessage,
}

impl OllamaGateway {
    /// Create a new Ollama gateway
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Configuration`] if the model name is empty or the
    /// HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(LlmError::Configuration("model name must not be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model,
            client,
            retry: RetryPolicy::new(DEFAULT_MAX_RETRIES),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Create a new Ollama gateway on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts per call
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry = RetryPolicy::new(max_retries);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chat_once(&self, body: &OllamaChatRequest<'_>) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(parsed.message.content)
    }
}

#[async_trait]
impl CompletionGateway for OllamaGateway {
    type Error = LlmError;

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, Self::Error> {
        let body = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            stream: false,
            options: ChatOptions { temperature },
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "Sending Ollama chat request");
        self.retry.run(|| self.chat_once(&body)).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_gateway_creation() {
        let gateway = OllamaGateway::new("http://localhost:11434/", "llama3").unwrap();
        assert_eq!(gateway.endpoint(), "http://localhost:11434");
        assert_eq!(gateway.model_name(), "llama3");
        assert_eq!(gateway.retry.max_attempts, DEFAULT_MAX_RETRIES);
        assert_eq!(gateway.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_ollama_gateway_default_endpoint() {
        let gateway = OllamaGateway::default_endpoint("mistral").unwrap();
        assert_eq!(gateway.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_empty_model_is_configuration_error() {
        let result = OllamaGateway::new(DEFAULT_ENDPOINT, "  ");
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_builder_settings() {
        let gateway = OllamaGateway::default_endpoint("llama3")
            .unwrap()
            .with_max_retries(5)
            .with_timeout(Duration::from_secs(3));
        assert_eq!(gateway.retry.max_attempts, 5);
        assert_eq!(gateway.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_request_serialization() {
        let body = OllamaChatRequest {
            model: "llama3",
            messages: vec![
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "usr" },
            ],
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.0);
    }

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{"model":"llama3","message":{"role":"assistant","content":"hi"},"done":true}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.content, "hi");
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_complete_integration() {
        let gateway = OllamaGateway::default_endpoint("llama3").unwrap();
        let result = gateway
            .complete("You are terse.", "Say 'hello' and nothing else", 0.0)
            .await;

        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Invalid port: the request never leaves the client
        let gateway = OllamaGateway::new("http://localhost:99999", "llama3")
            .unwrap()
            .with_max_retries(1);

        let result = gateway.complete("sys", "test", 0.0).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
