//! Shared domain types for the coaching backend.
//!
//! Users, chat messages, notes, identities, coach state, oracle action
//! shapes, LLM wire types, configuration and error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror,
//! schemars.

pub mod action;
pub mod chat;
pub mod coach;
pub mod config;
pub mod error;
pub mod identity;
pub mod llm;
pub mod note;
pub mod user;
