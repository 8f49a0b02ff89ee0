//! The oracle: one structured LLM call per built prompt.
//!
//! Wraps a [`BoxLlmProvider`] with the configured model settings and a hard
//! timeout, and turns the raw completion into a JSON object for the action
//! dispatcher. Callers must not hold a user lock or a DB transaction across
//! [`Oracle::invoke`].

use std::time::{Duration, Instant};

use coach_types::config::OracleConfig;
use coach_types::llm::{CompletionRequest, LlmError, Message, MessageRole, StopReason};
use tracing::{debug, warn};

use crate::llm::box_provider::BoxLlmProvider;
use crate::prompt::BuiltPrompt;

/// Errors from a single oracle invocation.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle provider error: {0}")]
    Llm(#[from] LlmError),

    #[error("malformed oracle response: {0}")]
    Malformed(String),

    #[error("provider '{0}' does not support structured output")]
    UnsupportedProvider(String),
}

/// Model parameters applied to every oracle request.
#[derive(Debug, Clone)]
pub struct OracleSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    pub timeout: Duration,
}

impl From<&OracleConfig> for OracleSettings {
    fn from(config: &OracleConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: Some(config.temperature),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// LLM-backed structured response generator.
#[derive(Debug)]
pub struct Oracle {
    provider: BoxLlmProvider,
    settings: OracleSettings,
}

impl Oracle {
    /// Every oracle call relies on a JSON-schema response, so a provider
    /// without structured output is refused. `max_tokens` is capped at the
    /// provider's output limit.
    pub fn new(provider: BoxLlmProvider, mut settings: OracleSettings) -> Result<Self, OracleError> {
        let capabilities = provider.capabilities();
        if !capabilities.structured_output {
            return Err(OracleError::UnsupportedProvider(provider.name().to_string()));
        }
        if settings.max_tokens > capabilities.max_output_tokens {
            warn!(
                requested = settings.max_tokens,
                limit = capabilities.max_output_tokens,
                "max_tokens exceeds provider output limit; capping"
            );
            settings.max_tokens = capabilities.max_output_tokens;
        }
        Ok(Self { provider, settings })
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    /// Send `prompt` as the system prompt with its response schema attached
    /// and return the parsed JSON object.
    #[tracing::instrument(
        name = "oracle.invoke",
        skip(self, prompt),
        fields(schema = prompt.schema.name(), provider = self.provider.name())
    )]
    pub async fn invoke(&self, prompt: &BuiltPrompt) -> Result<serde_json::Value, OracleError> {
        let request = self.request_for(prompt);
        let started = Instant::now();

        let response = tokio::time::timeout(self.settings.timeout, self.provider.complete(&request))
            .await
            .map_err(|_| OracleError::Timeout(self.settings.timeout))??;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "oracle responded"
        );
        if response.stop_reason == StopReason::MaxTokens {
            warn!(
                max_tokens = self.settings.max_tokens,
                "oracle response hit max_tokens; output may be truncated"
            );
        }

        parse_response_json(&response.content)
    }

    fn request_for(&self, prompt: &BuiltPrompt) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![Message {
                role: MessageRole::User,
                content: format!(
                    "Respond with a single {} JSON object.",
                    prompt.schema.name()
                ),
            }],
            system: Some(prompt.text.clone()),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stop_sequences: None,
            output_config: Some(prompt.schema.output_config()),
        }
    }
}

/// Parse an oracle completion into a JSON object.
///
/// Tolerates a surrounding Markdown code fence (with or without a `json`
/// tag). Anything that is not a JSON object is `Malformed`.
pub fn parse_response_json(raw: &str) -> Result<serde_json::Value, OracleError> {
    let body = strip_code_fence(raw.trim());
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| OracleError::Malformed(format!("{e}; raw content: {raw}")))?;

    if !value.is_object() {
        return Err(OracleError::Malformed(format!(
            "expected a JSON object, got: {value}"
        )));
    }
    Ok(value)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}
