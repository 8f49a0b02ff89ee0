//! Service-level error type.

use coach_types::error::{DispatchError, RepositoryError};
use coach_types::user::UserId;

use crate::oracle::OracleError;

#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}
