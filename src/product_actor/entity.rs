use chrono::Utc;

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductUpdate};

fn required(field: &str, value: String) -> Result<String, ProductError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ProductError::ValidationError(format!("{} is required", field)));
    }
    Ok(value)
}

impl Entity for Product {
    const KIND: &'static str = "product";

    type Id = String;
    type CreateParams = ProductCreate;
    type UpdateParams = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    /// Creates a new Product from creation parameters.
    ///
    /// # Errors
    /// Name and category must be non-blank.
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, ProductError> {
        let now = Utc::now();
        Ok(Self {
            id,
            name: required("name", params.name)?,
            category: required("category", params.category)?,
            price: params.price,
            stock: params.stock,
            description: params.description,
            image_url: params.image_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies the fields present in the update.
    fn on_update(&mut self, update: ProductUpdate) -> Result<(), ProductError> {
        if let Some(name) = update.name {
            self.name = required("name", name)?;
        }
        if let Some(category) = update.category {
            self.category = required("category", category)?;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Handles stock actions.
    ///
    /// # Errors
    /// `ReserveStock` fails with `InsufficientStock` instead of going below zero,
    /// and with `InvalidQuantity` for a zero amount.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::ReserveStock(0) => Err(ProductError::InvalidQuantity(0)),
            ProductAction::ReserveStock(amount) => {
                self.stock = self.stock.checked_sub(amount).ok_or_else(|| {
                    ProductError::InsufficientStock {
                        product: self.name.clone(),
                        requested: amount,
                        available: self.stock,
                    }
                })?;
                self.updated_at = Utc::now();
                Ok(ProductActionResult::ReserveStock(self.stock))
            }
            ProductAction::Restock(amount) => {
                self.stock = self.stock.checked_add(amount).ok_or_else(|| {
                    ProductError::ValidationError(format!("stock overflow for {}", self.name))
                })?;
                self.updated_at = Utc::now();
                Ok(ProductActionResult::Restock(self.stock))
            }
            ProductAction::SetStock(level) => {
                self.stock = level;
                self.updated_at = Utc::now();
                Ok(ProductActionResult::SetStock(self.stock))
            }
        }
    }
}
