//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (coach-infra) implements. The core crate never depends on any specific
//! storage technology. Every query is scoped by user: an id belonging to a
//! different user behaves exactly like an id that does not exist.

pub mod chat;
pub mod coach_state;
pub mod identity;
pub mod note;
pub mod user;
