//! Invoice codes: `INV-YYYYMMDD-NNNNNN`.
//!
//! The suffix is random; uniqueness is enforced by the order store, which
//! refuses to insert a second order with the same code.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;

pub const INVOICE_PREFIX: &str = "INV";

/// Source of candidate invoice codes. Swapped out in tests to force collisions.
pub type InvoiceCodeFn = Arc<dyn Fn() -> String + Send + Sync>;

pub fn invoice_code(now: DateTime<Utc>, rng: &mut impl Rng) -> String {
    format!(
        "{}-{}-{}",
        INVOICE_PREFIX,
        now.format("%Y%m%d"),
        rng.gen_range(100_000..1_000_000)
    )
}

pub fn random_invoice_codes() -> InvoiceCodeFn {
    Arc::new(|| invoice_code(Utc::now(), &mut rand::thread_rng()))
}
