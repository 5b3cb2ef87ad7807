//! Typed clients, one per store.

#[macro_use]
mod macros;

mod admin_client;
mod discount_client;
mod order_client;
mod product_client;

pub use admin_client::*;
pub use discount_client::*;
pub use order_client::*;
pub use product_client::*;
