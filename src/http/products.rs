use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::error::ApiError;
use super::extract::{lenient_int, AdminSession, JsonBody, ProductFields, ProductForm};
use super::AppState;
use crate::domain::{Product, ProductCreate, ProductUpdate};

fn non_negative<N: TryFrom<i64>>(field: &str, value: i64) -> Result<N, ApiError> {
    N::try_from(value)
        .map_err(|_| ApiError::InvalidRequest(format!("{} must be a non-negative integer", field)))
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl ProductFields {
    fn into_create(self, image_url: Option<String>) -> Result<ProductCreate, ApiError> {
        let required = |field: &str, value: Option<String>| {
            non_blank(value).ok_or_else(|| ApiError::InvalidRequest(format!("{} is required", field)))
        };
        let price = self
            .price
            .ok_or_else(|| ApiError::InvalidRequest("price is required".into()))?;
        Ok(ProductCreate {
            name: required("name", self.name)?,
            category: required("category", self.category)?,
            price: non_negative("price", price)?,
            stock: non_negative("stock", self.stock.unwrap_or(0))?,
            description: non_blank(self.description),
            image_url,
        })
    }

    fn into_update(self, image_url: Option<String>) -> Result<ProductUpdate, ApiError> {
        Ok(ProductUpdate {
            name: self.name,
            category: self.category,
            price: self.price.map(|p| non_negative("price", p)).transpose()?,
            stock: self.stock.map(|s| non_negative("stock", s)).transpose()?,
            description: non_blank(self.description),
            image_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StockBody {
    #[serde(default, deserialize_with = "lenient_int")]
    stock: Option<i64>,
}

/// `GET /api/products` — newest first.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.products.list_products().await?))
}

/// `GET /api/products/:id`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .products
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))
}

/// `POST /api/products` — multipart (with optional `image`) or JSON.
pub async fn create_product(
    _session: AdminSession,
    State(state): State<AppState>,
    form: ProductForm,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    // Validate before touching the disk.
    let params = form.fields.into_create(None)?;
    let image_url = match &form.image {
        Some(upload) => Some(state.images.save(upload).await?),
        None => None,
    };

    match state
        .products
        .create_product(ProductCreate {
            image_url: image_url.clone(),
            ..params
        })
        .await
    {
        Ok(product) => {
            info!(product_id = %product.id, "Product created");
            Ok((StatusCode::CREATED, Json(product)))
        }
        Err(e) => {
            if let Some(url) = image_url {
                state.images.remove(&url).await;
            }
            Err(e.into())
        }
    }
}

/// `PUT /api/products/:id` — a new image replaces the stored one.
pub async fn update_product(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: ProductForm,
) -> Result<Json<Product>, ApiError> {
    let existing = state
        .products
        .get_product(id.clone())
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    let mut update = form.fields.into_update(None)?;
    let image_url = match &form.image {
        Some(upload) => Some(state.images.save(upload).await?),
        None => None,
    };
    update.image_url = image_url.clone();

    match state.products.update_product(id, update).await {
        Ok(product) => {
            if let (Some(_), Some(old)) = (&image_url, &existing.image_url) {
                state.images.remove(old).await;
            }
            Ok(Json(product))
        }
        Err(e) => {
            if let Some(url) = &image_url {
                state.images.remove(url).await;
            }
            Err(e.into())
        }
    }
}

/// `PATCH /api/products/:id/stock` — sets the absolute stock level.
pub async fn set_stock(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StockBody>,
) -> Result<Json<Product>, ApiError> {
    let stock = body
        .stock
        .ok_or_else(|| ApiError::InvalidRequest("stock is required".into()))?;
    let level = non_negative("stock", stock)?;
    state.products.set_stock(id.clone(), level).await?;
    state
        .products
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))
}

/// `DELETE /api/products/:id` — also removes the stored image.
pub async fn delete_product(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let product = state.products.delete_product(id).await?;
    if let Some(url) = &product.image_url {
        state.images.remove(url).await;
    }
    info!(product_id = %product.id, "Product deleted");
    Ok(Json(json!({ "message": "Product deleted" })))
}
