use chrono::{DateTime, Utc};
use serde::Serialize;

pub type ProductId = String;

/// Represents a product in the catalog.
///
/// `stock` is unsigned, and every decrement goes through the product actor's
/// conditional `ReserveStock` action, so it can never go negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: u64,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a new product.
#[derive(Debug, Clone, Default)]
pub struct ProductCreate {
    pub name: String,
    pub category: String,
    pub price: u64,
    pub stock: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update of a product. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<u64>,
    pub stock: Option<u32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: u64, stock: u32) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            stock,
            ..Self::default()
        }
    }
}
