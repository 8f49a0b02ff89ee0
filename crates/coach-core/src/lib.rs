//! Coaching logic and repository trait definitions.
//!
//! This crate defines the "ports" (repository, LLM provider and job queue
//! traits) that the infrastructure layer implements, plus everything that
//! decides what the coach does: context formatting, prompt assembly, the
//! coaching state machine, action dispatch and note extraction. It depends
//! only on `coach-types` -- never on `coach-infra` or any database/IO crate.

pub mod action;
pub mod coach;
pub mod context;
pub mod jobs;
pub mod llm;
pub mod lock;
pub mod oracle;
pub mod prompt;
pub mod repository;
pub mod sentinel;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;
