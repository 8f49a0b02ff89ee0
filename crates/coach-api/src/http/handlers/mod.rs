//! HTTP request handlers for the REST API.

pub mod chat;
pub mod health;
pub mod sentinel;
pub mod user;

use coach_types::user::UserId;

use crate::http::error::AppError;

/// Parse a `{id}` path segment into a [`UserId`].
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("invalid user id '{raw}'")))
}
