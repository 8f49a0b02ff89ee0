//! NoteRepository trait definition.

use coach_types::error::RepositoryError;
use coach_types::note::UserNote;
use coach_types::user::UserId;
use uuid::Uuid;

/// Repository trait for user-owned notes.
///
/// `update` and `delete` return `RepositoryError::NotFound` when no note
/// with that id exists *for that user*.
pub trait NoteRepository: Send + Sync {
    /// Save a new note.
    fn create(
        &self,
        note: &UserNote,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List a user's notes ordered by created_at ASC.
    fn list(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<UserNote>, RepositoryError>> + Send;

    /// Get one of the user's notes.
    fn get(
        &self,
        user_id: &UserId,
        note_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<UserNote>, RepositoryError>> + Send;

    /// Replace the text of one of the user's notes.
    fn update(
        &self,
        user_id: &UserId,
        note_id: &Uuid,
        note: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete one of the user's notes.
    fn delete(
        &self,
        user_id: &UserId,
        note_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
