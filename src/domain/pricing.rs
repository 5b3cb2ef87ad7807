//! Pricing resolver: list price + category discount -> effective unit price.
//!
//! Rounding is half away from zero, done in integer arithmetic so that
//! `10000 at 10%` is exactly `9000`.

use std::collections::HashMap;

use super::{Discount, Product};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub unit_price: u64,
    pub promo_label: Option<String>,
}

/// `round(list_price * (1 - percent/100))`. Percentages above 100 are clamped.
pub fn discounted_price(list_price: u64, percent: u8) -> u64 {
    let keep = u128::from(100 - percent.min(100));
    // Never larger than list_price, so the narrowing cannot truncate.
    ((u128::from(list_price) * keep + 50) / 100) as u64
}

pub fn promo_label(discount: &Discount) -> String {
    format!("{}% {}", discount.percent, discount.category)
}

/// Resolves the effective unit price for a list price and the category's discount.
pub fn resolve_price(list_price: u64, discount: Option<&Discount>) -> PriceQuote {
    match discount.filter(|d| d.is_effective()) {
        Some(discount) => PriceQuote {
            unit_price: discounted_price(list_price, discount.percent),
            promo_label: Some(promo_label(discount)),
        },
        None => PriceQuote {
            unit_price: list_price,
            promo_label: None,
        },
    }
}

/// Category -> effective discount lookup, built once per checkout.
#[derive(Debug, Clone, Default)]
pub struct DiscountBook {
    by_category: HashMap<String, Discount>,
}

impl DiscountBook {
    pub fn new(discounts: impl IntoIterator<Item = Discount>) -> Self {
        let by_category = discounts
            .into_iter()
            .filter(Discount::is_effective)
            .map(|d| (d.category.clone(), d))
            .collect();
        Self { by_category }
    }

    pub fn for_category(&self, category: &str) -> Option<&Discount> {
        self.by_category.get(category)
    }

    pub fn quote(&self, product: &Product) -> PriceQuote {
        resolve_price(product.price, self.for_category(&product.category))
    }

    pub fn len(&self) -> usize {
        self.by_category.len()
    }
}
