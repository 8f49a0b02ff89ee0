//! LlmProvider trait definition.
//!
//! This is the core abstraction behind the oracle. The coaching flows only
//! ever need one complete (non-streaming) structured response per call, so
//! the trait is a single async `complete` plus provider metadata.

use coach_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

/// Trait for LLM provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Wrap an
/// implementation in [`BoxLlmProvider`](super::box_provider::BoxLlmProvider)
/// for runtime selection.
///
/// Implementations live in coach-infra (e.g., `AnthropicProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// What this provider supports (structured output, context size).
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
