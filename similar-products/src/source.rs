//! Port over the upstream catalog so the aggregation pipeline can be
//! exercised without network I/O.

use async_trait::async_trait;
use catalog::{CatalogClient, CatalogError, ProductDetail};

#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn similar_ids(&self, product_id: &str) -> Result<Vec<String>, CatalogError>;
    async fn product_detail(&self, product_id: &str) -> Result<ProductDetail, CatalogError>;
}

#[async_trait]
impl ProductSource for CatalogClient {
    async fn similar_ids(&self, product_id: &str) -> Result<Vec<String>, CatalogError> {
        self.get_similar_ids(product_id).await
    }

    async fn product_detail(&self, product_id: &str) -> Result<ProductDetail, CatalogError> {
        self.get_product_detail(product_id).await
    }
}
