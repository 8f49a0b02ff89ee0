//! Service configuration types.
//!
//! `CoachConfig` represents the top-level `config.toml`. Every field has a
//! default so an empty file (or no file) yields a runnable configuration;
//! the only hard requirement is the oracle API key, resolved from the
//! environment at startup.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the coaching backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachConfig {
    /// SQLite URL. `None` means `{data_dir}/coach.db`.
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Settings for the LLM oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Upper bound on a single oracle call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Override the provider base URL (proxies, tests).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

/// Prompt assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Prefix every prompt section with a cache-busting timestamp line.
    /// Must stay off in production.
    #[serde(default)]
    pub dev_mode: bool,
    /// How many of the most recent messages go into a coach prompt.
    #[serde(default = "default_recent_message_limit")]
    pub recent_message_limit: usize,
    /// Per-message character cap inside the recent-messages section.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            recent_message_limit: default_recent_message_limit(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

fn default_recent_message_limit() -> usize {
    20
}

fn default_max_message_chars() -> usize {
    2000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Bounded capacity of the background job channel.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}
