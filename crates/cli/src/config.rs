//! Configuration loading from parley.toml.

use std::path::Path;
use std::time::Duration;

use mcp::ServerConfig;
use runtime::{AgentConfig, OPENAI_BASE_URL, OpenAiBackend, RetryPolicy};
use serde::Deserialize;

/// Environment variable consulted when `backend.api_key` is unset.
pub const API_KEY_ENV: &str = "PARLEY_API_KEY";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub agent: AgentSettings,
    pub mcp_servers: Vec<ServerConfig>,
}

/// Language-model provider configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Provider dialect (currently only "openai").
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub strict_schemas: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_tokens: 1024,
            strict_schemas: false,
        }
    }
}

/// Decision loop tuning.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub max_iterations: usize,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub user_name: Option<String>,
    pub discovery_concurrency: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        let agent = AgentConfig::default();
        Self {
            max_iterations: agent.max_iterations,
            retry_attempts: agent.retry.attempts,
            retry_delay_ms: agent.retry.delay.as_millis() as u64,
            user_name: None,
            discovery_concurrency: runtime::DEFAULT_DISCOVERY_CONCURRENCY,
        }
    }
}

impl AgentSettings {
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            max_iterations: self.max_iterations,
            retry: RetryPolicy {
                attempts: self.retry_attempts,
                delay: Duration::from_millis(self.retry_delay_ms),
            },
            user_name: self.user_name.clone(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Fill `backend.api_key` from the environment value if the file left it unset.
    pub fn with_env_api_key(mut self, key: Option<String>) -> Self {
        if self.backend.api_key.is_none() {
            self.backend.api_key = key.filter(|k| !k.is_empty());
        }
        self
    }

    /// Build the language-model backend.
    pub fn backend(&self) -> Result<OpenAiBackend, ConfigError> {
        let backend = &self.backend;
        if backend.provider != "openai" {
            return Err(ConfigError::UnsupportedProvider(backend.provider.clone()));
        }
        let mut builder = OpenAiBackend::builder(&backend.model)
            .base_url(&backend.base_url)
            .max_tokens(backend.max_tokens)
            .strict_schemas(backend.strict_schemas);
        if let Some(key) = &backend.api_key {
            builder = builder.api_key(key);
        }
        Ok(builder.build())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("unsupported backend provider \"{0}\": only \"openai\" is supported")]
    UnsupportedProvider(String),
}
