use std::collections::HashMap;

use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::clients::{DiscountClient, ProductClient};
use crate::domain::invoice::InvoiceCodeFn;
use crate::domain::pricing::DiscountBook;
use crate::domain::{
    CartLine, CheckoutReceipt, Customer, Order, OrderCreate, OrderId, OrderLine, OrderStatus,
    OrderUpdate, Product, ProductId,
};
use crate::order_actor::OrderError;

/// Client for interacting with the Order actor.
///
/// This client also runs the checkout saga: it validates the cart against the
/// product and discount stores, reserves stock in one batch, and persists the
/// order under a fresh invoice code, restocking if the order cannot be saved.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    product_client: ProductClient,
    discount_client: DiscountClient,
    invoice_codes: InvoiceCodeFn,
    max_invoice_attempts: u32,
}

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        product_client: ProductClient,
        discount_client: DiscountClient,
        invoice_codes: InvoiceCodeFn,
        max_invoice_attempts: u32,
    ) -> Self {
        Self {
            inner,
            product_client,
            discount_client,
            invoice_codes,
            max_invoice_attempts,
        }
    }

    #[instrument(skip(self, customer, lines), fields(lines = lines.len()))]
    pub async fn checkout(
        &self,
        customer: Customer,
        lines: Vec<CartLine>,
    ) -> Result<CheckoutReceipt, OrderError> {
        info!("Processing checkout request (Client Side)");

        // Step 1: Validate request shape
        if lines.is_empty() {
            return Err(OrderError::InvalidRequest("Cart is empty".into()));
        }
        if !customer.is_complete() {
            return Err(OrderError::InvalidRequest(
                "Customer name, phone and address are required".into(),
            ));
        }

        // Step 2: Load every referenced product in one request
        let mut ids: Vec<ProductId> = Vec::new();
        for line in &lines {
            if !ids.contains(&line.product_id) {
                ids.push(line.product_id.clone());
            }
        }
        let catalog: HashMap<ProductId, Product> = self
            .product_client
            .get_many_products(ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        if let Some(missing) = lines.iter().find(|l| !catalog.contains_key(&l.product_id)) {
            warn!(product_id = %missing.product_id, "Product not found");
            return Err(OrderError::ProductNotFound(missing.product_id.clone()));
        }

        // Step 3: Validate quantities
        if let Some(bad) = lines.iter().find(|l| l.qty <= 0) {
            warn!(product_id = %bad.product_id, qty = bad.qty, "Invalid quantity");
            return Err(OrderError::InvalidQuantity(bad.product_id.clone()));
        }

        // Step 4: Validate stock, summing repeated products
        let mut requested: Vec<(&ProductId, u64)> = Vec::new();
        for line in &lines {
            let qty = line.qty.unsigned_abs();
            match requested.iter_mut().find(|(id, _)| **id == line.product_id) {
                Some((_, total)) => *total = total.saturating_add(qty),
                None => requested.push((&line.product_id, qty)),
            }
        }
        for (id, qty) in &requested {
            let product = &catalog[*id];
            if *qty > u64::from(product.stock) {
                warn!(product = %product.name, available = product.stock, requested = qty, "Insufficient stock");
                return Err(OrderError::InsufficientStock {
                    product: product.name.clone(),
                    requested: *qty,
                    available: product.stock,
                });
            }
        }
        // One reservation per product, so a lost race reports the summed quantity.
        let reservations = requested
            .iter()
            .map(|(id, qty)| {
                u32::try_from(*qty)
                    .map(|qty| ((*id).clone(), qty))
                    .map_err(|_| OrderError::InvalidQuantity((*id).clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Step 5: Price every line
        let discounts = self
            .discount_client
            .list_active_discounts()
            .await
            .map_err(|e| OrderError::DatabaseError(e.to_string()))?;
        let book = DiscountBook::new(discounts);
        debug!(discounts = book.len(), "Discounts loaded");

        let mut items = Vec::with_capacity(lines.len());
        let mut total: u64 = 0;
        for line in &lines {
            let product = &catalog[&line.product_id];
            // Bounded by the stock check above.
            let qty = u32::try_from(line.qty)
                .map_err(|_| OrderError::InvalidQuantity(line.product_id.clone()))?;
            let quote = book.quote(product);
            let item = OrderLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                qty,
                list_price: product.price,
                final_price: quote.unit_price,
                promo_label: quote.promo_label,
            };
            total = item
                .line_total()
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or_else(|| OrderError::InvalidRequest("Order total is too large".into()))?;
            items.push(item);
        }

        // Step 6: Reserve stock, all lines or none
        self.product_client.reserve_batch(reservations.clone()).await?;
        info!(total, "Stock reserved successfully");

        // Step 7: Persist under a unique invoice code, compensating on failure
        match self.persist(customer, items, total).await {
            Ok(order) => {
                info!(order_id = %order.id, invoice_code = %order.invoice_code, "Checkout completed");
                Ok(CheckoutReceipt {
                    order_id: order.id,
                    invoice_code: order.invoice_code,
                    total: order.total,
                })
            }
            Err(e) => {
                error!(error = %e, "Order could not be saved, restocking");
                for (product_id, restock_error) in self.product_client.restock_lines(reservations).await {
                    error!(product_id = %product_id, error = %restock_error, "Restock after failed checkout failed");
                }
                Err(e)
            }
        }
    }

    /// Inserts the order, drawing a new invoice code whenever the store reports
    /// the current one as taken.
    async fn persist(
        &self,
        customer: Customer,
        items: Vec<OrderLine>,
        total: u64,
    ) -> Result<Order, OrderError> {
        for attempt in 1..=self.max_invoice_attempts {
            let invoice_code = (self.invoice_codes)();
            let taken = invoice_code.clone();
            let params = OrderCreate {
                invoice_code,
                items: items.clone(),
                total,
                customer: customer.clone(),
            };
            match self
                .inner
                .create_unique(params, move |o: &Order| o.invoice_code == taken)
                .await
            {
                Ok(order) => return Ok(order),
                Err(FrameworkError::Conflict) => {
                    warn!(attempt, "Invoice code already used, drawing another");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(OrderError::InvoiceExhausted(self.max_invoice_attempts))
    }

    /// All orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let mut orders = self.inner.list().await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn find_by_invoice(&self, invoice_code: &str) -> Result<Option<Order>, OrderError> {
        debug!("Sending request");
        let wanted = invoice_code.to_string();
        let mut found = self
            .inner
            .list_where(move |o: &Order| o.invoice_code == wanted)
            .await?;
        Ok(found.pop())
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        debug!("Sending request");
        Ok(self.inner.update(id, OrderUpdate { status }).await?)
    }
}

impl_client_methods!(OrderClient, Order, OrderError, order);
