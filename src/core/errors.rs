// Domain error types - secure error handling with no information disclosure

use thiserror::Error;

/// Main error type for the stock service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Unknown username or wrong password (HTTP 401)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No credential attached to the request (HTTP 401)
    #[error("Authentication required")]
    Unauthenticated,

    /// Credential present but not sufficient (HTTP 403)
    #[error("Forbidden")]
    Forbidden,

    /// Referenced entity does not exist (HTTP 404)
    #[error("{0} not found")]
    NotFound(String),

    /// Request failed boundary validation (HTTP 400)
    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    /// Query or transaction error from the storage layer (HTTP 500)
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Rollback after a failed transaction step itself failed (HTTP 500)
    ///
    /// Carries both errors so the original failure is never masked.
    #[error("Rollback failed after '{original}': {rollback}")]
    RollbackFailure { original: String, rollback: String },

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ServiceError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidCredentials => 401,
            ServiceError::Unauthenticated => 401,
            ServiceError::Forbidden => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::ValidationFailure(_) => 400,
            ServiceError::StorageFailure(_) => 500,
            ServiceError::RollbackFailure { .. } => 500,
            ServiceError::ConfigError(_) => 500,
        }
    }

    /// Get user-facing error message (no sensitive information)
    ///
    /// 4xx messages are safe by construction; everything that touches the
    /// storage layer collapses to a generic message and the detail goes to
    /// the logs instead.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::InvalidCredentials => "Invalid username or password".to_string(),
            ServiceError::Unauthenticated => "Authentication required".to_string(),
            ServiceError::Forbidden => "Forbidden".to_string(),
            ServiceError::NotFound(what) => format!("{} not found", what),
            ServiceError::ValidationFailure(detail) => detail.clone(),
            ServiceError::StorageFailure(_) => "Internal Server Error".to_string(),
            ServiceError::RollbackFailure { .. } => "Internal Server Error".to_string(),
            ServiceError::ConfigError(_) => "Internal Server Error".to_string(),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::StorageFailure(err.to_string())
    }
}
