//! Anthropic Claude LLM provider implementation.
//!
//! [`AnthropicProvider`] implements the
//! [`LlmProvider`](coach_core::llm::provider::LlmProvider) trait for the
//! non-streaming Messages API with structured output.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
