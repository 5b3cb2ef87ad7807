use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use super::extract::{AdminSession, JsonBody};
use super::AppState;
use crate::domain::{CartLine, Customer, Order, OrderStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemBody {
    #[serde(default)]
    product_id: String,
    #[serde(default)]
    qty: Option<Value>,
}

/// Whole numbers, as JSON numbers or numeric strings. Anything else becomes 0
/// so checkout reports it as an invalid quantity for that product.
fn cart_qty(raw: Option<&Value>) -> i64 {
    match raw {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 9.0e18 => f as i64,
            _ => 0,
        }),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    #[serde(default)]
    customer: Customer,
    #[serde(default)]
    items: Vec<CartItemBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    success: bool,
    message: &'static str,
    invoice_code: String,
    order_id: String,
    total: u64,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    status: String,
}

/// `POST /api/checkout`
pub async fn checkout(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let lines = body
        .items
        .into_iter()
        .map(|item| CartLine::new(item.product_id, cart_qty(item.qty.as_ref())))
        .collect();
    let receipt = state.orders.checkout(body.customer, lines).await?;
    Ok(Json(CheckoutResponse {
        success: true,
        message: "Checkout successful, stock updated",
        invoice_code: receipt.invoice_code,
        order_id: receipt.order_id,
        total: receipt.total,
    }))
}

/// `GET /api/orders` — newest first.
pub async fn list_orders(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.list_orders().await?))
}

/// `GET /api/orders/:id`
pub async fn get_order(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    state
        .orders
        .get_order(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))
}

/// `GET /api/invoices/:code`
pub async fn get_invoice(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Order>, ApiError> {
    state
        .orders
        .find_by_invoice(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))
}

/// `PATCH /api/orders/:id/status` — only `PROCESSING` and `SHIPPED` are accepted.
pub async fn set_status(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<Order>, ApiError> {
    let status: OrderStatus = body
        .status
        .parse()
        .map_err(|_| ApiError::InvalidRequest("Invalid status".into()))?;
    Ok(Json(state.orders.set_status(id, status).await?))
}

/// `DELETE /api/orders/:id`
pub async fn delete_order(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.orders.delete_order(id).await?;
    Ok(Json(json!({ "message": "Order deleted" })))
}
