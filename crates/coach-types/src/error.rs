use thiserror::Error;

/// Errors from repository operations (used by trait definitions in coach-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors raised while loading or validating startup configuration.
///
/// Every variant is fatal: the process must refuse to serve traffic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API key: environment variable '{0}' is not set")]
    MissingApiKey(String),

    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid config value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

/// Errors raised while decoding or applying oracle actions.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A recognised response field failed to validate. Nothing was applied.
    #[error("invalid '{field}' payload: {message}")]
    Validation { field: String, message: String },

    /// The response was not a JSON object at all.
    #[error("oracle response must be a JSON object, got {0}")]
    NotAnObject(String),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

impl DispatchError {
    /// Build a validation error for the named response field.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        DispatchError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
