//! CoachStateRepository trait definition.

use coach_types::coach::CoachState;
use coach_types::error::RepositoryError;
use coach_types::user::UserId;

/// Repository trait for the one-per-user coaching state row.
pub trait CoachStateRepository: Send + Sync {
    /// Insert the initial state for a user. `Conflict` if one already exists.
    fn create(
        &self,
        state: &CoachState,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a user's state.
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<CoachState>, RepositoryError>> + Send;

    /// Persist `state` if the stored version still equals `state.version`.
    ///
    /// Returns the saved state with its version incremented. A stale
    /// version yields `Conflict`; a missing row yields `NotFound`.
    fn save(
        &self,
        state: &CoachState,
    ) -> impl std::future::Future<Output = Result<CoachState, RepositoryError>> + Send;
}
