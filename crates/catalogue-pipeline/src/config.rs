//! Configuration file parsing for the pipeline.
//!
//! Loads settings from TOML with one table per component, then lets the
//! environment override the secrets and the deployment-specific values.

use catalogue_extractor::ExtractorConfig;
use catalogue_gatekeeper::ValidationConfig;
use catalogue_llm::anthropic::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use catalogue_llm::LlmError;
use catalogue_store::StoreError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the provider API key
pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding `provider.model`
pub const ENV_MODEL: &str = "CATALOGUE_MODEL";
/// Environment variable overriding `store.database`
pub const ENV_DATABASE: &str = "CATALOGUE_DATABASE";

/// Pipeline configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The provider could not be built
    #[error("Provider setup failed: {0}")]
    Provider(#[from] LlmError),

    /// The store could not be opened
    #[error("Store setup failed: {0}")]
    Store(#[from] StoreError),
}

/// `[provider]` table
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the messages API
    pub endpoint: String,
    /// API key; usually supplied through `ANTHROPIC_API_KEY`
    pub api_key: String,
    /// Model requested on every call
    pub model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// Keep the key out of logs
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// `[store]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite database path, or `:memory:`
    pub database: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database: "catalogue.db".to_string(),
        }
    }
}

/// `[pipeline]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Overall deadline for one run, in seconds
    pub run_timeout_secs: u64,
}

impl PipelineSettings {
    /// Overall deadline for one run
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

impl Default for PipelineSettings {
    /// Long enough for a full retry cycle at default settings
    fn default() -> Self {
        Self {
            run_timeout_secs: 300,
        }
    }
}

/// Complete pipeline configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    /// Generation service settings
    pub provider: ProviderSettings,
    /// Extraction client settings
    pub extractor: ExtractorConfig,
    /// Validation policy
    pub validation: ValidationConfig,
    /// Storage settings
    pub store: StoreSettings,
    /// Run-level settings
    pub pipeline: PipelineSettings,
}

impl CatalogueConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    ///
    /// Blank values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var(ENV_API_KEY) {
            self.provider.api_key = key;
        }
        if let Some(model) = var(ENV_MODEL) {
            self.provider.model = model;
        }
        if let Some(database) = var(ENV_DATABASE) {
            self.store.database = database;
        }
        self
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "provider.api_key (or {})",
                ENV_API_KEY
            )));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::MissingField("provider.model".to_string()));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.store.database.trim().is_empty() {
            return Err(ConfigError::MissingField("store.database".to_string()));
        }
        if self.pipeline.run_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.run_timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.extractor
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("extractor: {}", e)))?;
        Ok(())
    }
}
