//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use async_trait::async_trait;
use std::sync::Arc;

/// Sampling temperature used for every stage call
///
/// Fixed at zero so that repeated runs against the same model are as
/// reproducible as the provider allows.
pub const DETERMINISTIC_TEMPERATURE: f32 = 0.0;

/// Trait for language-model text completion
///
/// Implemented by the infrastructure layer (claimify-llm). One call sends a
/// system prompt and a user prompt and returns the raw reply text. Calls must
/// be stateless and free of side effects so the pipeline can time them out,
/// retry them or drop them on cancellation.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Error type for completion calls
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send one system+user prompt pair and return the raw reply
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, Self::Error>;

    /// Identifier of the model behind this gateway
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<G> CompletionGateway for Arc<G>
where
    G: CompletionGateway + ?Sized,
{
    type Error = G::Error;

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, Self::Error> {
        (**self).complete(system_prompt, user_prompt, temperature).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct EchoError;

    impl fmt::Display for EchoError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("echo error")
        }
    }

    impl std::error::Error for EchoError {}

    struct Echo;

    #[async_trait]
    impl CompletionGateway for Echo {
        type Error = EchoError;

        async fn complete(
            &self,
            system_prompt: &str,
            user_prompt: &str,
            _temperature: f32,
        ) -> Result<String, Self::Error> {
            if user_prompt.is_empty() {
                return Err(EchoError);
            }
            Ok(format!("{}|{}", system_prompt, user_prompt))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_arc_forwards_calls() {
        let gateway = Arc::new(Echo);
        let reply = gateway
            .complete("sys", "user", DETERMINISTIC_TEMPERATURE)
            .await
            .unwrap();
        assert_eq!(reply, "sys|user");
        assert_eq!(gateway.model_name(), "echo");
    }

    #[tokio::test]
    async fn test_errors_are_returned() {
        let result = Echo.complete("sys", "", DETERMINISTIC_TEMPERATURE).await;
        assert!(result.is_err());
    }
}
