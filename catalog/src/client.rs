use crate::breaker::CircuitBreaker;
use crate::cache::CatalogCache;
use crate::config::{CatalogConfig, RetryConfig, UpstreamConfig};
use crate::error::CatalogError;
use crate::retry::with_retry;
use crate::types::ProductDetail;
use http::StatusCode;
use shared::metrics_defs::{Flow, Outcome, record_request};

/// Gateway to the upstream catalog service.
///
/// Both lookups are cache-then-network with per-call retry; the
/// similar-ids call is additionally guarded by a circuit breaker whose
/// fallback is an empty list, so an outage of the similarity data
/// degrades to "no recommendations" instead of failing the caller.
/// Detail lookups deliberately carry no breaker: they are independent,
/// lower-blast-radius calls.
pub struct CatalogClient {
    http: reqwest::Client,
    upstream: UpstreamConfig,
    cache: CatalogCache,
    breaker: CircuitBreaker,
    detail_retry: RetryConfig,
    similar_ids_retry: RetryConfig,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.upstream.connect_timeout())
            .timeout(config.upstream.request_timeout())
            .build()?;

        Ok(CatalogClient {
            http,
            upstream: config.upstream.clone(),
            cache: CatalogCache::new(&config.cache),
            breaker: CircuitBreaker::new(config.circuit_breaker.clone()),
            detail_retry: config.detail_retry.clone(),
            similar_ids_retry: config.similar_ids_retry.clone(),
        })
    }

    /// Detail for one product. 404 maps to `NotFound`; any other non-2xx
    /// or transport failure maps to `Upstream` and is retried when
    /// transient. Callers must handle both variants: the distinction is
    /// what lets the aggregator classify skip reasons.
    pub async fn get_product_detail(&self, product_id: &str) -> Result<ProductDetail, CatalogError> {
        if let Some(detail) = self.cache.get_detail(product_id) {
            return Ok(detail);
        }

        tracing::info!("fetching product detail for {product_id}");
        let result = with_retry(&self.detail_retry, CatalogError::is_transient, || {
            self.fetch_detail(product_id)
        })
        .await;

        match &result {
            Ok(_) => record_request(Flow::ProductDetail, Outcome::Success),
            Err(CatalogError::NotFound) => {
                record_request(Flow::ProductDetail, Outcome::NotFound);
            }
            Err(CatalogError::Upstream { status }) => {
                tracing::error!("product detail fetch failed for {product_id}: status={status}");
                record_request(Flow::ProductDetail, Outcome::Error);
            }
        }

        let detail = result?;
        self.cache.put_detail(product_id, detail.clone());
        Ok(detail)
    }

    /// Similar-product ids for one product, in the upstream's ranking
    /// order. When the breaker refuses the call, the registered fallback
    /// returns an empty list without touching the network. Errors that
    /// survive the retries propagate; the breaker sees them as one
    /// logical outcome each.
    pub async fn get_similar_ids(&self, product_id: &str) -> Result<Vec<String>, CatalogError> {
        if let Some(ids) = self.cache.get_similar_ids(product_id) {
            return Ok(ids);
        }

        if !self.breaker.try_acquire() {
            tracing::warn!("similar-ids circuit open, falling back to empty for {product_id}");
            record_request(Flow::SimilarIds, Outcome::Fallback);
            return Ok(Vec::new());
        }

        tracing::info!("fetching similar ids for {product_id}");
        let result = with_retry(&self.similar_ids_retry, CatalogError::is_transient, || {
            self.fetch_similar_ids(product_id)
        })
        .await;

        match &result {
            Ok(ids) => {
                self.breaker.record_success();
                record_request(Flow::SimilarIds, Outcome::Success);
                self.cache.put_similar_ids(product_id, ids.clone());
            }
            Err(CatalogError::NotFound) => {
                // A 404 is a definitive answer from a healthy upstream,
                // not a fault to count toward the failure ratio.
                self.breaker.record_success();
                tracing::info!("no similar ids found for {product_id}");
                record_request(Flow::SimilarIds, Outcome::NotFound);
            }
            Err(CatalogError::Upstream { status }) => {
                self.breaker.record_failure();
                tracing::error!("similar ids fetch failed for {product_id}: status={status}");
                record_request(Flow::SimilarIds, Outcome::Error);
            }
        }

        result
    }

    async fn fetch_detail(&self, product_id: &str) -> Result<ProductDetail, CatalogError> {
        let url = self.endpoint(&self.upstream.product_detail_path, product_id);
        let response = self.http.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound),
            status if status.is_success() => Ok(response.json::<ProductDetail>().await?),
            status => Err(CatalogError::Upstream {
                status: status.as_u16(),
            }),
        }
    }

    async fn fetch_similar_ids(&self, product_id: &str) -> Result<Vec<String>, CatalogError> {
        let url = self.endpoint(&self.upstream.similar_ids_path, product_id);
        let response = self.http.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound),
            status if status.is_success() => Ok(response.json::<Vec<String>>().await?),
            status => Err(CatalogError::Upstream {
                status: status.as_u16(),
            }),
        }
    }

    fn endpoint(&self, template: &str, product_id: &str) -> String {
        format!(
            "{}{}",
            self.upstream.base_url.as_str().trim_end_matches('/'),
            template.replace("{productId}", product_id)
        )
    }
}
