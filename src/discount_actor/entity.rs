use chrono::Utc;

use super::error::DiscountError;
use crate::actor_framework::Entity;
use crate::domain::{Discount, DiscountCreate, DiscountUpdate};

fn check_percent(percent: u8) -> Result<u8, DiscountError> {
    if percent > 100 {
        return Err(DiscountError::ValidationError(format!(
            "percent must be between 0 and 100, got {}",
            percent
        )));
    }
    Ok(percent)
}

impl Entity for Discount {
    const KIND: &'static str = "discount";

    type Id = String;
    type CreateParams = DiscountCreate;
    type UpdateParams = DiscountUpdate;
    type Action = ();
    type ActionResult = ();
    type Error = DiscountError;

    fn from_create_params(id: String, params: DiscountCreate) -> Result<Self, DiscountError> {
        let category = params.category.trim().to_string();
        if category.is_empty() {
            return Err(DiscountError::ValidationError("category is required".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            category,
            percent: check_percent(params.percent)?,
            active: params.active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces percentage and active flag. The category is the key and never changes.
    fn on_update(&mut self, update: DiscountUpdate) -> Result<(), DiscountError> {
        self.percent = check_percent(update.percent)?;
        self.active = update.active;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), DiscountError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(category: &str, percent: u8) -> DiscountCreate {
        DiscountCreate {
            category: category.into(),
            percent,
            active: true,
        }
    }

    #[test]
    fn test_percent_above_hundred_rejected() {
        assert!(Discount::from_create_params("d".into(), create("Dairy", 101)).is_err());
        let mut dairy = Discount::from_create_params("d".into(), create("Dairy", 10)).unwrap();
        let err = dairy
            .on_update(DiscountUpdate {
                percent: 150,
                active: true,
            })
            .unwrap_err();
        assert!(matches!(err, DiscountError::ValidationError(_)));
        assert_eq!(dairy.percent, 10);
    }

    #[test]
    fn test_category_is_trimmed_and_required() {
        let dairy = Discount::from_create_params("d".into(), create(" Dairy ", 10)).unwrap();
        assert_eq!(dairy.category, "Dairy");
        assert_eq!(
            Discount::from_create_params("d".into(), create("  ", 10)),
            Err(DiscountError::ValidationError("category is required".into()))
        );
    }
}
