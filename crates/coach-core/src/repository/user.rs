//! User repository trait definition.

use coach_types::coach::CoachState;
use coach_types::error::RepositoryError;
use coach_types::user::{User, UserId};

/// Repository trait for user records.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait UserRepository: Send + Sync {
    /// Persist a new user together with its initial coaching state.
    ///
    /// Both rows are written in one storage transaction: either the user
    /// exists with a state, or neither exists.
    fn create_with_state(
        &self,
        user: &User,
        state: &CoachState,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a user by id.
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;
}
