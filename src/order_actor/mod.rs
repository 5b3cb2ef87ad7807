//! Order storage. The checkout saga that fills it lives in `clients::order_client`.

pub mod entity;
pub mod error;

pub use error::*;
