use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during discount operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DiscountError {
    #[error("Discount not found: {0}")]
    NotFound(String),
    #[error("Discount validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<DiscountError>> for DiscountError {
    fn from(e: FrameworkError<DiscountError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            FrameworkError::Entity(inner) => inner,
            FrameworkError::Conflict => Self::ValidationError("duplicate entry".into()),
            other => Self::ActorCommunicationError(other.to_string()),
        }
    }
}
