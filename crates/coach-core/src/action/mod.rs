//! Action dispatch.
//!
//! An oracle response is decoded into a validated [`ActionBatch`] first;
//! only a batch that decoded cleanly is executed. Execution happens under
//! the user's lock in a fixed order: add, update, delete, transition.

pub mod decode;
pub mod dispatcher;

pub use decode::ActionBatch;
pub use dispatcher::{ActionDispatcher, DispatchReport, SkippedItem};
