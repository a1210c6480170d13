//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Gateway construction or transport error
    #[error("Gateway error: {0}")]
    Gateway(#[from] claimify_llm::LlmError),

    /// Extraction error
    #[error("Extraction error: {0}")]
    Extractor(#[from] claimify_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimify_extractor::ExtractorError;
    use claimify_llm::LlmError;

    #[test]
    fn test_wrapped_errors_keep_message() {
        let err: CliError = LlmError::Configuration("missing key".to_string()).into();
        assert!(err.to_string().contains("missing key"));

        let err: CliError = ExtractorError::AnswerTooLong { length: 12, max: 10 }.into();
        assert!(err.to_string().starts_with("Extraction error:"));
    }
}
