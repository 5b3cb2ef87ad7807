use thiserror::Error;

use crate::admin_actor::AdminError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Not logged in: {0}")]
    Unauthenticated(String),
    #[error("Session expired")]
    Expired,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Admin(#[from] AdminError),
}
