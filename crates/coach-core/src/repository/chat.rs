//! ChatRepository trait definition.
//!
//! The chat log is append-only, so the port has no update or delete.

use coach_types::chat::ChatMessage;
use coach_types::error::RepositoryError;
use coach_types::user::UserId;
use uuid::Uuid;

/// Repository trait for the per-user chat log.
pub trait ChatRepository: Send + Sync {
    /// Append a message to the user's log.
    fn append(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a user's messages ordered by created_at ASC.
    ///
    /// With `limit`, only the most recent `limit` messages are returned
    /// (still in ascending order).
    fn get_messages(
        &self,
        user_id: &UserId,
        limit: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Get a single message by id.
    fn get_message(
        &self,
        message_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatMessage>, RepositoryError>> + Send;
}
