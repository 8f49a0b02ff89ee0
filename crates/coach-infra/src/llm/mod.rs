//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`](coach_core::llm::provider::LlmProvider)
//! trait defined in `coach-core`, plus [`create_provider`] which builds the
//! oracle's provider from configuration.

pub mod anthropic;

use std::time::Duration;

use secrecy::SecretString;

use coach_core::llm::box_provider::BoxLlmProvider;
use coach_types::config::OracleConfig;
use coach_types::llm::LlmError;

use self::anthropic::AnthropicProvider;

/// Create the oracle's [`BoxLlmProvider`] from its configuration and the
/// already-resolved API key.
pub fn create_provider(config: &OracleConfig, api_key: SecretString) -> Result<BoxLlmProvider, LlmError> {
    let mut provider = AnthropicProvider::new(
        api_key,
        config.model.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;
    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(BoxLlmProvider::new(provider))
}
