//! HTTP transport: axum router over the shop's clients.
//!
//! ## Routes
//!
//! Everything except `/health` and `/uploads/*` lives under `/api`.
//! Mutating catalog, discount and order routes require an [`extract::AdminSession`].

mod auth;
mod discounts;
pub mod error;
pub mod extract;
mod orders;
mod products;

use std::future::Future;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::app_system::ShopSystem;
use crate::auth::AuthGateway;
use crate::clients::{DiscountClient, OrderClient, ProductClient};
use crate::uploads::ImageStore;

/// Multipart overhead allowed on top of the image size limit.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductClient,
    pub discounts: DiscountClient,
    pub orders: OrderClient,
    pub auth: AuthGateway,
    pub images: ImageStore,
}

impl AppState {
    pub fn new(system: &ShopSystem, auth: AuthGateway, images: ImageStore) -> Self {
        Self {
            products: system.product_client.clone(),
            discounts: system.discount_client.clone(),
            orders: system.order_client.clone(),
            auth,
            images,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let body_limit = state.images.max_bytes() + FORM_OVERHEAD_BYTES;

    let api = Router::new()
        .route("/auth/seed-admin", post(auth::seed_admin))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/:id/stock", patch(products::set_stock))
        .route(
            "/discounts",
            get(discounts::list_discounts).post(discounts::upsert_discount),
        )
        .route("/checkout", post(orders::checkout))
        .route("/orders", get(orders::list_orders))
        .route(
            "/orders/:id",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route("/orders/:id/status", patch(orders::set_status))
        .route("/invoices/:code", get(orders::get_invoice));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(state.images.dir()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves, then finish in-flight requests.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    info!(%addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// `GET /health` — returns `{ "ok": true }`.
async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
