use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

use super::ProductId;

pub type OrderId = String;

/// Fulfillment status. The only field of an order that changes after checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(Self::Processing),
            "SHIPPED" => Ok(Self::Shipped),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "PROCESSING"),
            Self::Shipped => write!(f, "SHIPPED"),
        }
    }
}

/// Customer details copied into the order at checkout time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, alias = "nama")]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, alias = "alamat")]
    pub address: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.name, &self.phone, &self.address]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// One requested line of a cart. Input only, never stored.
///
/// The quantity is signed so that zero and negative requests can be reported
/// against the product they name.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub qty: i64,
}

impl CartLine {
    pub fn new(product_id: impl Into<ProductId>, qty: i64) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}

/// A frozen line of a stored order. Name and prices are captured at checkout
/// so later catalog edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub qty: u32,
    pub list_price: u64,
    pub final_price: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_label: Option<String>,
}

impl OrderLine {
    /// `final_price * qty`, or `None` on overflow.
    pub fn line_total(&self) -> Option<u64> {
        self.final_price.checked_mul(u64::from(self.qty))
    }
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub invoice_code: String,
    pub items: Vec<OrderLine>,
    pub total: u64,
    pub customer: Customer,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub invoice_code: String,
    pub items: Vec<OrderLine>,
    pub total: u64,
    pub customer: Customer,
}

#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub status: OrderStatus,
}

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub invoice_code: String,
    pub total: u64,
}
