//! Claimify LLM Gateway Layer
//!
//! Pluggable language-model gateways for the claim extraction pipeline.
//!
//! # Architecture
//!
//! This crate provides implementations of the `CompletionGateway` trait from
//! `claimify-domain`. Every gateway takes a system prompt and a user prompt and
//! returns the raw reply text; prompt construction and parsing belong to the
//! pipeline.
//!
//! # Gateways
//!
//! - `MockGateway`: Scripted, deterministic gateway for testing
//! - `OllamaGateway`: Local Ollama chat API integration
//! - `OpenAiGateway`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use claimify_llm::MockGateway;
//! use claimify_domain::CompletionGateway;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let gateway = MockGateway::new("Hello from LLM!");
//! let reply = gateway.complete("system", "user", 0.0).await.unwrap();
//! assert_eq!(reply, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;
pub mod retry;

use async_trait::async_trait;
use claimify_domain::CompletionGateway;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaGateway;
pub use openai::OpenAiGateway;
pub use retry::RetryPolicy;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Missing or invalid gateway settings (model, credentials, endpoint)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether retrying the same call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::Communication(_) | LlmError::RateLimitExceeded | LlmError::Timeout
        )
    }

    /// Map a reqwest transport error
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}

/// One call observed by the [`MockGateway`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// System prompt as sent
    pub system_prompt: String,

    /// User prompt as sent
    pub user_prompt: String,

    /// Temperature as sent
    pub temperature: f32,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
    Delayed(Duration, String),
}

#[derive(Debug, Clone)]
struct MockRule {
    needles: Vec<String>,
    reply: MockReply,
}

impl MockRule {
    fn matches(&self, system_prompt: &str, user_prompt: &str) -> bool {
        self.needles
            .iter()
            .all(|n| user_prompt.contains(n.as_str()) || system_prompt.contains(n.as_str()))
    }
}

/// Mock gateway for deterministic testing
///
/// This gateway returns pre-configured replies without making any network
/// calls. A rule matches when every one of its needles occurs in the system
/// or user prompt; the first matching rule (in insertion order) wins and the
/// default reply is used when none match.
///
/// # Examples
///
/// ```
/// use claimify_llm::MockGateway;
/// use claimify_domain::CompletionGateway;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let gateway = MockGateway::default();
/// gateway.add_response(&["SELECTION", "Paris"], "Final submission:\nContains a specific and verifiable proposition");
/// gateway.add_error(&["DECOMPOSITION"]);
///
/// let reply = gateway.complete("sys", "SELECTION task\nParis is in France.", 0.0).await.unwrap();
/// assert!(reply.contains("Contains"));
/// assert!(gateway.complete("sys", "DECOMPOSITION task", 0.0).await.is_err());
/// assert_eq!(gateway.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockGateway {
    model: String,
    default_response: String,
    latency: Option<Duration>,
    rules: Arc<Mutex<Vec<MockRule>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockGateway {
    /// Create a new MockGateway with a fixed reply for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock".to_string(),
            default_response: response.into(),
            latency: None,
            rules: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the reported model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Delay every reply by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Reply with `response` when every needle occurs in the prompts
    pub fn add_response(&self, needles: &[&str], response: impl Into<String>) {
        self.push_rule(needles, MockReply::Text(response.into()));
    }

    /// Reply after `delay` when every needle occurs in the prompts
    pub fn add_delayed_response(&self, needles: &[&str], delay: Duration, response: impl Into<String>) {
        self.push_rule(needles, MockReply::Delayed(delay, response.into()));
    }

    /// Fail with a communication error when every needle occurs in the prompts
    pub fn add_error(&self, needles: &[&str]) {
        self.push_rule(needles, MockReply::Error);
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Get every call made so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Count calls whose user prompt contains `needle`
    pub fn calls_containing(&self, needle: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.user_prompt.contains(needle))
            .count()
    }

    /// Reset the call log
    pub fn reset_call_count(&self) {
        lock(&self.calls).clear();
    }

    fn push_rule(&self, needles: &[&str], reply: MockReply) {
        lock(&self.rules).push(MockRule {
            needles: needles.iter().map(|n| n.to_string()).collect(),
            reply,
        });
    }

    fn find_reply(&self, system_prompt: &str, user_prompt: &str) -> MockReply {
        lock(&self.rules)
            .iter()
            .find(|rule| rule.matches(system_prompt, user_prompt))
            .map(|rule| rule.reply.clone())
            .unwrap_or_else(|| MockReply::Text(self.default_response.clone()))
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl CompletionGateway for MockGateway {
    type Error = LlmError;

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, Self::Error> {
        lock(&self.calls).push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            temperature,
        });

        let reply = self.find_reply(system_prompt, user_prompt);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            MockReply::Error => Err(LlmError::Communication("Mock error".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_gateway_default() {
        let gateway = MockGateway::new("Test response");
        let result = gateway.complete("sys", "any prompt", 0.0).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_gateway_specific_responses() {
        let gateway = MockGateway::default();
        gateway.add_response(&["hello"], "world");
        gateway.add_response(&["foo", "bar"], "baz");

        assert_eq!(gateway.complete("", "hello there", 0.0).await.unwrap(), "world");
        assert_eq!(gateway.complete("foo", "bar", 0.0).await.unwrap(), "baz");
        // Only one needle present: falls through to default
        assert_eq!(
            gateway.complete("", "foo only", 0.0).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let gateway = MockGateway::default();
        gateway.add_response(&["Smith"], "first");
        gateway.add_response(&["Smith", "energy"], "second");

        assert_eq!(
            gateway.complete("", "Smith and energy", 0.0).await.unwrap(),
            "first"
        );
    }

    #[tokio::test]
    async fn test_mock_gateway_call_log() {
        let gateway = MockGateway::new("test");
        assert_eq!(gateway.call_count(), 0);

        gateway.complete("s1", "prompt1", 0.0).await.unwrap();
        gateway.complete("s2", "prompt2", 0.0).await.unwrap();
        assert_eq!(gateway.call_count(), 2);
        assert_eq!(gateway.calls_containing("prompt2"), 1);

        let calls = gateway.calls();
        assert_eq!(calls[0].system_prompt, "s1");
        assert_eq!(calls[1].user_prompt, "prompt2");
        assert_eq!(calls[1].temperature, 0.0);

        gateway.reset_call_count();
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_gateway_error() {
        let gateway = MockGateway::default();
        gateway.add_error(&["bad prompt"]);

        let result = gateway.complete("", "bad prompt", 0.0).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    async fn test_mock_gateway_clone_shares_state() {
        let gateway1 = MockGateway::new("test");
        let gateway2 = gateway1.clone();

        gateway2.add_response(&["x"], "y");
        gateway1.complete("", "x", 0.0).await.unwrap();

        assert_eq!(gateway1.call_count(), 1);
        assert_eq!(gateway2.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_response() {
        let gateway = MockGateway::default();
        gateway.add_delayed_response(&["slow"], Duration::from_secs(5), "done");

        let started = tokio::time::Instant::now();
        let reply = gateway.complete("", "slow", 0.0).await.unwrap();
        assert_eq!(reply, "done");
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::Timeout.is_retryable());
        assert!(LlmError::RateLimitExceeded.is_retryable());
        assert!(LlmError::Communication("x".into()).is_retryable());
        assert!(!LlmError::Configuration("x".into()).is_retryable());
        assert!(!LlmError::ModelNotAvailable("m".into()).is_retryable());
        assert!(!LlmError::InvalidResponse("x".into()).is_retryable());
    }
}
