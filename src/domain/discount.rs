use chrono::{DateTime, Utc};
use serde::Serialize;

pub type DiscountId = String;

/// A flat percentage discount applied to every product of one category.
///
/// At most one discount exists per category; writes go through an upsert
/// keyed on `category`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: DiscountId,
    pub category: String,
    pub percent: u8,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DiscountCreate {
    pub category: String,
    pub percent: u8,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct DiscountUpdate {
    pub percent: u8,
    pub active: bool,
}

impl Discount {
    /// A discount only changes prices when it is active and non-zero.
    pub fn is_effective(&self) -> bool {
        self.active && self.percent > 0
    }
}

impl From<&DiscountCreate> for DiscountUpdate {
    fn from(create: &DiscountCreate) -> Self {
        Self {
            percent: create.percent,
            active: create.active,
        }
    }
}
