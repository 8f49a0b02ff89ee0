//! Background job port.
//!
//! The coach-turn path enqueues work it does not wait for; an
//! infrastructure worker drains the queue and hands each job to a
//! [`JobHandler`]. Jobs may be dropped or replayed, so handlers must
//! tolerate both.

use coach_types::user::UserId;
use uuid::Uuid;

/// Unit of deferred work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Mine the user's chat history for notes after a new user message.
    ExtractUserNotes {
        user_id: UserId,
        chat_message_id: Uuid,
    },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::ExtractUserNotes { .. } => "extract_user_notes",
        }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Job::ExtractUserNotes { user_id, .. } => *user_id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job queue is full")]
    QueueFull,

    #[error("job queue is closed")]
    Closed,
}

/// Fire-and-forget submission. Never blocks.
pub trait JobQueue: Send + Sync {
    fn enqueue(&self, job: Job) -> Result<(), JobError>;
}

/// Executes dequeued jobs. Failures are the handler's to log.
pub trait JobHandler: Send + Sync + 'static {
    fn handle(&self, job: Job) -> impl std::future::Future<Output = ()> + Send;
}
