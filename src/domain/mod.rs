pub mod admin;
pub mod discount;
pub mod invoice;
pub mod order;
pub mod pricing;
pub mod product;

pub use admin::*;
pub use discount::*;
pub use order::*;
pub use product::*;
