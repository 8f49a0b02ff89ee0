//! Infrastructure layer for the coaching backend.
//!
//! Implements the ports defined in `coach-core`: SQLite repositories, the
//! Anthropic oracle provider and the in-process job queue, plus the
//! configuration loader.

pub mod config;
pub mod jobs;
pub mod llm;
pub mod sqlite;
