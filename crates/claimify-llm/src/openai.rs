//! OpenAI-compatible Gateway Implementation
//!
//! Talks to any server exposing the `/chat/completions` endpoint (OpenAI,
//! Azure deployments behind a proxy, vLLM, LM Studio, ...).
//!
//! # Examples
//!
//! ```no_run
//! use claimify_llm::OpenAiGateway;
//!
//! // Reads OPENAI_API_KEY from the environment
//! let gateway = OpenAiGateway::from_env("gpt-4o-mini")?;
//! # Ok::<(), claimify_llm::LlmError>(())
//! ```

use crate::retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
use crate::LlmError;
use async_trait::async_trait;
use claimify_domain::CompletionGateway;
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default timeout for completion requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gateway for OpenAI-style chat completion APIs
#[derive(Clone)]
pub struct OpenAiGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGateway")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl OpenAiGateway {
    /// Create a gateway with an explicit API key
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Configuration`] if the key or model is empty.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        let model = model.into();

        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key must not be empty".to_string()));
        }
        if model.trim().is_empty() {
            return Err(LlmError::Configuration("model name must not be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            retry: RetryPolicy::new(DEFAULT_MAX_RETRIES),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Create from environment variable `OPENAI_API_KEY`
    pub fn from_env(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::from_env_var(API_KEY_ENV, model)
    }

    /// Create with the API key read from `var`
    pub fn from_env_var(var: &str, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = std::env::var(var)
            .map_err(|_| LlmError::Configuration(format!("{} not set", var)))?;
        Self::new(api_key, model)
    }

    /// Set a custom base URL (for Azure, proxies, local servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
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

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn chat_once(&self, body: &ChatRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status, &self.model, error_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No content in response".to_string()))
    }
}

/// Map a non-success HTTP status to an error
fn classify_status(status: StatusCode, model: &str, body: String) -> LlmError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::Configuration(format!("HTTP {}: {}", status, body))
        }
        s if s.is_server_error() => LlmError::Communication(format!("HTTP {}: {}", status, body)),
        _ => LlmError::Other(format!("HTTP {}: {}", status, body)),
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    type Error = LlmError;

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, Self::Error> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message { role: "system", content: system_prompt },
                Message { role: "user", content: user_prompt },
            ],
            temperature,
        };

        debug!(model = %self.model, base_url = %self.base_url, "Sending chat completion request");
        self.retry.run(|| self.chat_once(&body)).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
