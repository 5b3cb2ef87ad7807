use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::product_actor::ProductError;

/// Errors that can occur during order operations, checkout included.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(String),
    #[error("Insufficient stock for {product}. Available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        requested: u64,
        available: u32,
    },
    #[error("No free invoice code after {0} attempts")]
    InvoiceExhausted(u32),
    #[error("Order database error: {0}")]
    DatabaseError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(e: FrameworkError<OrderError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            FrameworkError::Entity(inner) => inner,
            FrameworkError::Conflict => Self::DatabaseError("duplicate invoice code".into()),
            other => Self::ActorCommunicationError(other.to_string()),
        }
    }
}

/// Stock failures raised by the product store surface as checkout errors.
impl From<ProductError> for OrderError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => Self::ProductNotFound(id),
            ProductError::InsufficientStock {
                product,
                requested,
                available,
            } => Self::InsufficientStock {
                product,
                requested: u64::from(requested),
                available,
            },
            ProductError::InvalidQuantity(qty) => Self::InvalidQuantity(qty.to_string()),
            ProductError::ValidationError(msg) => Self::InvalidRequest(msg),
            ProductError::ActorCommunicationError(msg) => Self::ActorCommunicationError(msg),
        }
    }
}
