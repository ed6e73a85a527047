// TTL result cache for the two upstream payload shapes. A miss always goes
// back to the network; absence is never stored as a value.
use crate::config::CacheConfig;
use crate::metrics_defs::{
    DETAIL_CACHE_HIT, DETAIL_CACHE_MISS, SIMILAR_IDS_CACHE_HIT, SIMILAR_IDS_CACHE_MISS,
};
use crate::types::ProductDetail;
use moka::sync::Cache;
use shared::counter;

pub struct CatalogCache {
    details: Cache<String, ProductDetail>,
    similar_ids: Cache<String, Vec<String>>,
}

impl CatalogCache {
    pub fn new(config: &CacheConfig) -> Self {
        let details = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.product_detail_ttl())
            .build();

        let similar_ids = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.similar_ids_ttl())
            .build();

        CatalogCache {
            details,
            similar_ids,
        }
    }

    pub fn get_detail(&self, product_id: &str) -> Option<ProductDetail> {
        let cached = self.details.get(product_id);
        let metric_def = if cached.is_some() {
            DETAIL_CACHE_HIT
        } else {
            DETAIL_CACHE_MISS
        };
        counter!(metric_def).increment(1);
        cached
    }

    pub fn put_detail(&self, product_id: &str, detail: ProductDetail) {
        self.details.insert(product_id.to_string(), detail);
    }

    pub fn get_similar_ids(&self, product_id: &str) -> Option<Vec<String>> {
        let cached = self.similar_ids.get(product_id);
        let metric_def = if cached.is_some() {
            SIMILAR_IDS_CACHE_HIT
        } else {
            SIMILAR_IDS_CACHE_MISS
        };
        counter!(metric_def).increment(1);
        cached
    }

    pub fn put_similar_ids(&self, product_id: &str, ids: Vec<String>) {
        self.similar_ids.insert(product_id.to_string(), ids);
    }
}
