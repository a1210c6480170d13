//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Sentences of look-back in the context window
    pub preceding: usize,

    /// Sentences of look-forward in the context window
    pub following: usize,

    /// Maximum time for a single stage call (seconds)
    pub stage_timeout_secs: u64,

    /// Sentences processed at the same time (1 = strictly sequential)
    pub max_concurrency: usize,

    /// Maximum answer length (characters)
    pub max_answer_length: usize,
}

impl ExtractorConfig {
    /// Get the stage timeout as a Duration
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.stage_timeout_secs == 0 {
            return Err("stage_timeout_secs must be greater than 0".to_string());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".to_string());
        }
        if self.max_answer_length == 0 {
            return Err("max_answer_length must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Override the context window sizes
    pub fn with_window(mut self, preceding: usize, following: usize) -> Self {
        self.preceding = preceding;
        self.following = following;
        self
    }
}

impl Default for ExtractorConfig {
    /// Sequential processing with a two-sentence window on each side
    fn default() -> Self {
        Self {
            preceding: 2,
            following: 2,
            stage_timeout_secs: 120,
            max_concurrency: 1,
            max_answer_length: 50_000,
        }
    }
}

impl ExtractorConfig {
    /// Concurrent preset: several sentences in flight, shorter stage timeout
    pub fn concurrent() -> Self {
        Self {
            stage_timeout_secs: 60,
            max_concurrency: 8,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str)
            .map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
