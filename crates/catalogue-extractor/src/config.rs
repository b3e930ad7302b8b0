//! Configuration for the extraction client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the extraction client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Additional attempts after the first transient failure
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds); doubles on every retry
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay (milliseconds)
    pub max_delay_ms: u64,

    /// Upper bound on generated tokens per call
    pub max_tokens: u32,

    /// Mark the instructions prefix as cacheable by default
    pub use_cache: bool,
}

impl ExtractorConfig {
    /// Delay before the first retry
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Cap on a single backoff delay
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.base_delay_ms == 0 {
            return Err("base_delay_ms must be greater than 0".to_string());
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err("max_delay_ms cannot be less than base_delay_ms".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Three retries starting at one second
    fn default() -> Self {
        Self {
            max_text_length: 50_000,
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
            max_tokens: 4_096,
            use_cache: true,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: fail fast, for interactive callers
    pub fn aggressive() -> Self {
        Self {
            max_text_length: 20_000,
            max_retries: 1,
            base_delay_ms: 500,
            max_delay_ms: 2_000,
            max_tokens: 2_048,
            use_cache: true,
        }
    }

    /// Lenient preset: ride out longer outages, for batch ingestion
    pub fn lenient() -> Self {
        Self {
            max_text_length: 100_000,
            max_retries: 5,
            base_delay_ms: 2_000,
            max_delay_ms: 120_000,
            max_tokens: 8_192,
            use_cache: true,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
