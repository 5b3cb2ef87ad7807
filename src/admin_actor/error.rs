use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during admin account operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdminError {
    #[error("Admin not found: {0}")]
    NotFound(String),
    #[error("Admin already exists: {0}")]
    AlreadyExists(String),
    #[error("Admin validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<AdminError>> for AdminError {
    fn from(e: FrameworkError<AdminError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            FrameworkError::Entity(inner) => inner,
            FrameworkError::Conflict => Self::AlreadyExists(String::new()),
            other => Self::ActorCommunicationError(other.to_string()),
        }
    }
}
