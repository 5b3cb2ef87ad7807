use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use super::AppConfig;
use crate::actor_framework::ResourceActor;
use crate::clients::{AdminClient, DiscountClient, OrderClient, ProductClient};
use crate::domain::invoice::{random_invoice_codes, InvoiceCodeFn};
use crate::domain::{Admin, Discount, Order, Product};

/// Sequential ids of the form `{prefix}_{n}`, starting at 1.
fn counter_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
}

/// The store actors and their clients.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct ShopSystem {
    pub product_client: ProductClient,
    pub discount_client: DiscountClient,
    pub order_client: OrderClient,
    pub admin_client: AdminClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ShopSystem {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.actor_buffer,
            random_invoice_codes(),
            config.invoice_max_attempts,
        )
    }

    /// Must be called from within a tokio runtime.
    pub fn new(buffer: usize, invoice_codes: InvoiceCodeFn, max_invoice_attempts: u32) -> Self {
        // 1. Catalog
        let (product_actor, product_resource_client) =
            ResourceActor::<Product>::new(buffer, counter_ids("product"));
        let product_client = ProductClient::new(product_resource_client);
        let product_handle = tokio::spawn(product_actor.run());

        // 2. Discounts
        let (discount_actor, discount_resource_client) =
            ResourceActor::<Discount>::new(buffer, counter_ids("discount"));
        let discount_client = DiscountClient::new(discount_resource_client);
        let discount_handle = tokio::spawn(discount_actor.run());

        // 3. Orders, wired to the two stores checkout reads from
        let (order_actor, order_resource_client) =
            ResourceActor::<Order>::new(buffer, counter_ids("order"));
        let order_client = OrderClient::new(
            order_resource_client,
            product_client.clone(),
            discount_client.clone(),
            invoice_codes,
            max_invoice_attempts,
        );
        let order_handle = tokio::spawn(order_actor.run());

        // 4. Admin accounts
        let (admin_actor, admin_resource_client) =
            ResourceActor::<Admin>::new(buffer, counter_ids("admin"));
        let admin_client = AdminClient::new(admin_resource_client);
        let admin_handle = tokio::spawn(admin_actor.run());

        info!("Shop system started");
        Self {
            product_client,
            discount_client,
            order_client,
            admin_client,
            handles: vec![product_handle, discount_handle, order_handle, admin_handle],
        }
    }

    /// Drops the system's clients and waits for every actor to drain.
    ///
    /// An actor stops once all clones of its client are gone, so every handle
    /// given out (router state included) must be dropped first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.order_client);
        drop(self.product_client);
        drop(self.discount_client);
        drop(self.admin_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
