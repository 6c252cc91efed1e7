use shared_models::error::AppError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Data service error: {0}")]
    Upstream(String),
}

impl AvailabilityError {
    /// Classifies a data-API failure by the prefix the Supabase client writes.
    pub fn from_upstream(err: anyhow::Error) -> Self {
        let message = err.to_string();
        if message.starts_with("Resource not found") {
            AvailabilityError::NotFound(message)
        } else if message.starts_with("Authentication error") {
            AvailabilityError::Forbidden(message)
        } else {
            AvailabilityError::Upstream(message)
        }
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::Validation(msg) => AppError::ValidationError(msg),
            AvailabilityError::NotFound(msg) => AppError::NotFound(msg),
            AvailabilityError::Conflict(msg) => AppError::Conflict(msg),
            AvailabilityError::Forbidden(msg) => AppError::Forbidden(msg),
            AvailabilityError::Upstream(msg) => AppError::ExternalService(msg),
        }
    }
}

pub type AvailabilityResult<T> = Result<T, AvailabilityError>;
