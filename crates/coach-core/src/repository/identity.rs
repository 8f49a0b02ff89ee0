//! IdentityRepository trait definition.

use coach_types::error::RepositoryError;
use coach_types::identity::{Identity, IdentityState};
use coach_types::user::UserId;
use uuid::Uuid;

/// Repository trait for identity records.
///
/// Identities are authored outside the coaching core; `create` exists for
/// seeding and import paths.
pub trait IdentityRepository: Send + Sync {
    /// Save a new identity.
    fn create(
        &self,
        identity: &Identity,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List a user's identities in creation order (created_at ASC, id ASC).
    fn list(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Identity>, RepositoryError>> + Send;

    /// Get one of the user's identities.
    fn get(
        &self,
        user_id: &UserId,
        identity_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Identity>, RepositoryError>> + Send;

    /// Advance the lifecycle state of one of the user's identities.
    fn update_state(
        &self,
        user_id: &UserId,
        identity_id: &Uuid,
        state: IdentityState,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
