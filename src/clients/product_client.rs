use tracing::{debug, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{Product, ProductCreate, ProductId, ProductUpdate};
use crate::product_actor::{ProductAction, ProductError};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.create(params).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.update(id, update).await?)
    }

    /// All products, newest first.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        let mut products = self.inner.list().await?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(products)
    }

    /// Batch lookup in one round trip. Unknown ids are simply absent from the result.
    #[instrument(skip(self))]
    pub async fn get_many_products(&self, ids: Vec<ProductId>) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        Ok(self.inner.get_many(ids).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: ProductId, level: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        let result = self.inner.perform_action(id, ProductAction::SetStock(level)).await?;
        Ok(result.stock())
    }

    /// Decrements every line or none of them.
    #[instrument(skip(self))]
    pub async fn reserve_batch(&self, lines: Vec<(ProductId, u32)>) -> Result<(), ProductError> {
        debug!("Sending request");
        let actions = lines
            .into_iter()
            .map(|(id, qty)| (id, ProductAction::ReserveStock(qty)))
            .collect();
        self.inner.perform_batch(actions).await?;
        Ok(())
    }

    /// Puts reserved stock back after a checkout failed to persist its order.
    ///
    /// One action per line, so a product deleted since the reservation does not
    /// keep the other lines from being restored. Returns the lines that failed
    /// for any other reason.
    #[instrument(skip(self))]
    pub async fn restock_lines(&self, lines: Vec<(ProductId, u32)>) -> Vec<(ProductId, ProductError)> {
        debug!("Sending requests");
        let mut failed = Vec::new();
        for (id, qty) in lines {
            match self.inner.perform_action(id.clone(), ProductAction::Restock(qty)).await {
                Ok(_) => {}
                Err(FrameworkError::NotFound(_)) => {
                    warn!(product_id = %id, qty, "Product deleted before restock, skipping");
                }
                Err(e) => failed.push((id, ProductError::from(e))),
            }
        }
        failed
    }
}
