use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::discount_actor::DiscountError;
use crate::domain::{Discount, DiscountCreate, DiscountUpdate};

/// Client for interacting with the Discount actor.
#[derive(Clone)]
pub struct DiscountClient {
    inner: ResourceClient<Discount>,
}

impl_basic_client!(DiscountClient, Discount, DiscountError, discount);

impl DiscountClient {
    /// Discounts with the active flag set, ordered by category.
    #[instrument(skip(self))]
    pub async fn list_active_discounts(&self) -> Result<Vec<Discount>, DiscountError> {
        debug!("Sending request");
        let mut discounts = self.inner.list_where(|d: &Discount| d.active).await?;
        discounts.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(discounts)
    }

    /// Sets the discount for a category, replacing any existing one.
    #[instrument(skip(self))]
    pub async fn upsert_discount(&self, mut params: DiscountCreate) -> Result<Discount, DiscountError> {
        debug!("Sending request");
        params.category = params.category.trim().to_string();
        let category = params.category.clone();
        let update = DiscountUpdate::from(&params);
        Ok(self
            .inner
            .upsert(move |d: &Discount| d.category == category, params, update)
            .await?)
    }
}
