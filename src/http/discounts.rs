use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::error::ApiError;
use super::extract::{lenient_int, AdminSession, JsonBody};
use super::AppState;
use crate::domain::{Discount, DiscountCreate};

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct DiscountBody {
    #[serde(default, alias = "kategori")]
    category: String,
    #[serde(default, alias = "persen", deserialize_with = "lenient_int")]
    percent: Option<i64>,
    #[serde(default = "default_active", alias = "aktif")]
    active: bool,
}

/// `GET /api/discounts` — active discounts only.
pub async fn list_discounts(State(state): State<AppState>) -> Result<Json<Vec<Discount>>, ApiError> {
    Ok(Json(state.discounts.list_active_discounts().await?))
}

/// `POST /api/discounts` — sets the discount for a category, replacing any existing one.
pub async fn upsert_discount(
    _session: AdminSession,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<DiscountBody>,
) -> Result<Json<Discount>, ApiError> {
    let percent = body
        .percent
        .and_then(|p| u8::try_from(p).ok())
        .filter(|p| *p <= 100)
        .ok_or_else(|| ApiError::InvalidRequest("percent must be an integer from 0 to 100".into()))?;
    let discount = state
        .discounts
        .upsert_discount(DiscountCreate {
            category: body.category,
            percent,
            active: body.active,
        })
        .await?;
    Ok(Json(discount))
}
