//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, the oracle and the action
//! dispatcher. They depend on traits (ports) -- never on concrete
//! infrastructure implementations.

pub mod coach;
pub mod error;
pub mod user;

pub use coach::{CoachReply, CoachService};
pub use error::CoachError;
pub use user::UserService;
