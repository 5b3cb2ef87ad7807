//! HTTP-facing error kinds and their JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::admin_actor::AdminError;
use crate::auth::AuthError;
use crate::discount_actor::DiscountError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::uploads::UploadError;

pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    ProductNotFound(String),
    #[error("{0}")]
    InvalidQuantity(String),
    #[error("{0}")]
    InsufficientStock(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    NotFound(String),
    /// The detail is logged, never sent.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::ProductNotFound(_)
            | Self::InvalidQuantity(_)
            | Self::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(detail) => {
                error!(error = %detail, "Request failed");
                INTERNAL_MESSAGE.to_string()
            }
            other => {
                warn!(status = status.as_u16(), error = %other, "Request rejected");
                other.to_string()
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<ProductError> for ApiError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(_) => Self::NotFound("Product not found".into()),
            ProductError::InsufficientStock { .. } => Self::InsufficientStock(e.to_string()),
            ProductError::InvalidQuantity(_) => Self::InvalidQuantity(e.to_string()),
            ProductError::ValidationError(msg) => Self::InvalidRequest(msg),
            ProductError::ActorCommunicationError(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<DiscountError> for ApiError {
    fn from(e: DiscountError) -> Self {
        match e {
            DiscountError::NotFound(_) => Self::NotFound("Discount not found".into()),
            DiscountError::ValidationError(msg) => Self::InvalidRequest(msg),
            DiscountError::ActorCommunicationError(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(_) => Self::NotFound("Order not found".into()),
            OrderError::InvalidRequest(msg) => Self::InvalidRequest(msg),
            OrderError::ProductNotFound(_) => Self::ProductNotFound(e.to_string()),
            OrderError::InvalidQuantity(_) => Self::InvalidQuantity(e.to_string()),
            OrderError::InsufficientStock { .. } => Self::InsufficientStock(e.to_string()),
            OrderError::InvoiceExhausted(_)
            | OrderError::DatabaseError(_)
            | OrderError::ActorCommunicationError(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Unauthenticated(_) | AuthError::Expired => {
                Self::Unauthenticated("Invalid or expired session".into())
            }
            AuthError::InvalidRequest(msg) => Self::InvalidRequest(msg),
            AuthError::Admin(AdminError::ValidationError(msg)) => Self::InvalidRequest(msg),
            AuthError::Hashing(_) | AuthError::Admin(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::NotAnImage | UploadError::TooLarge { .. } => {
                Self::InvalidRequest(e.to_string())
            }
            UploadError::Io(_) => Self::Internal(e.to_string()),
        }
    }
}
