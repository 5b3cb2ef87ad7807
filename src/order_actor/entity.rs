use chrono::Utc;

use super::error::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderStatus, OrderUpdate};

impl Entity for Order {
    const KIND: &'static str = "order";

    type Id = String;
    type CreateParams = OrderCreate;
    type UpdateParams = OrderUpdate;
    type Action = ();
    type ActionResult = ();
    type Error = OrderError;

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// The order is initialized with status `PROCESSING`. Lines and total are
    /// taken as computed at checkout and never recomputed.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.invoice_code.is_empty() {
            return Err(OrderError::InvalidRequest("invoice code is required".into()));
        }
        if params.items.is_empty() {
            return Err(OrderError::InvalidRequest("an order needs at least one line".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            invoice_code: params.invoice_code,
            items: params.items,
            total: params.total,
            customer: params.customer,
            status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
        })
    }

    /// Only the status is mutable.
    fn on_update(&mut self, update: OrderUpdate) -> Result<(), OrderError> {
        self.status = update.status;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), OrderError> {
        Ok(())
    }
}
