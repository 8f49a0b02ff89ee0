//! User lifecycle service.

use coach_types::coach::CoachState;
use coach_types::user::{User, UserId};
use tracing::info;

use super::error::CoachError;
use crate::repository::user::UserRepository;

/// Creates users together with their coaching state.
pub struct UserService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Create a user and its initial coaching state (phase `INTRODUCTION`,
    /// no current identity, nothing skipped, version 0) in one write.
    #[tracing::instrument(name = "user.create", skip(self))]
    pub async fn create_user(&self, display_name: &str) -> Result<(User, CoachState), CoachError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(CoachError::Validation(
                "display name cannot be empty".to_string(),
            ));
        }

        let user = User::new(display_name.to_string());
        let state = CoachState::initial(user.id);
        self.users.create_with_state(&user, &state).await?;

        info!(user_id = %user.id, "created user");
        Ok((user, state))
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<User, CoachError> {
        self.users
            .get(&user_id)
            .await?
            .ok_or(CoachError::UserNotFound(user_id))
    }
}
