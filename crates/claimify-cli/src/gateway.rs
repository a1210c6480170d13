//! Gateway selection from configuration.

use crate::config::{GatewayConfig, Provider};
use crate::error::Result;
use claimify_domain::CompletionGateway;
use claimify_llm::{LlmError, OllamaGateway, OpenAiGateway};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Any gateway the CLI can drive.
pub type DynGateway = Arc<dyn CompletionGateway<Error = LlmError>>;

/// Build the configured gateway, with `model` overriding the config file.
pub fn build_gateway(config: &GatewayConfig, model: Option<&str>) -> Result<DynGateway> {
    let model = model.unwrap_or(&config.model);
    let timeout = Duration::from_secs(config.timeout_secs);

    let gateway: DynGateway = match config.provider {
        Provider::Ollama => {
            let endpoint = config
                .endpoint
                .as_deref()
                .unwrap_or(claimify_llm::ollama::DEFAULT_ENDPOINT);
            debug!(endpoint, model, "Using Ollama gateway");
            Arc::new(
                OllamaGateway::new(endpoint, model)?
                    .with_max_retries(config.max_retries)
                    .with_timeout(timeout),
            )
        }
        Provider::OpenAi => {
            let mut gateway = OpenAiGateway::from_env_var(&config.api_key_env, model)?
                .with_max_retries(config.max_retries)
                .with_timeout(timeout);
            if let Some(base_url) = &config.endpoint {
                gateway = gateway.with_base_url(base_url);
            }
            debug!(base_url = gateway.base_url(), model, "Using OpenAI gateway");
            Arc::new(gateway)
        }
    };

    Ok(gateway)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_ollama_gateway_from_config() {
        let config = GatewayConfig {
            provider: Provider::Ollama,
            endpoint: Some("http://gpu-box:11434/".to_string()),
            model: "llama3.1".to_string(),
            ..GatewayConfig::default()
        };

        let gateway = build_gateway(&config, None).unwrap();
        assert_eq!(gateway.model_name(), "llama3.1");
    }

    #[test]
    fn test_model_override() {
        let config = GatewayConfig {
            provider: Provider::Ollama,
            ..GatewayConfig::default()
        };

        let gateway = build_gateway(&config, Some("mistral")).unwrap();
        assert_eq!(gateway.model_name(), "mistral");
    }

    #[test]
    fn test_missing_api_key() {
        let config = GatewayConfig {
            provider: Provider::OpenAi,
            api_key_env: "CLAIMIFY_TEST_UNSET_KEY_VAR".to_string(),
            ..GatewayConfig::default()
        };

        let result = build_gateway(&config, None);
        assert!(matches!(result, Err(CliError::Gateway(LlmError::Configuration(_)))));
    }
}
