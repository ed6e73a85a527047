use crate::source::ProductSource;
use catalog::{CatalogError, ProductDetail};
use shared::metrics_defs::{Flow, Outcome, record_request};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::sleep;

/// Aggregates similar-product details for a base product.
///
/// Per-item failures are absorbed: they degrade the result cardinality
/// and are counted as skips, never surfaced. Only a failure on the base
/// similar-ids lookup escapes to the caller.
#[derive(Clone)]
pub struct SimilarProducts {
    source: Arc<dyn ProductSource>,
    deadline: Duration,
}

impl SimilarProducts {
    pub fn new(source: Arc<dyn ProductSource>, deadline: Duration) -> Self {
        SimilarProducts { source, deadline }
    }

    /// Resolve the details of every product similar to `product_id`,
    /// preserving the upstream's ranking order.
    pub async fn get_similar_products(
        &self,
        product_id: &str,
    ) -> Result<Vec<ProductDetail>, CatalogError> {
        tracing::info!("getting similar products for {product_id}");

        let similar_ids = self.source.similar_ids(product_id).await?;
        tracing::info!("found {} similar ids for {product_id}", similar_ids.len());

        let slots = self.fetch_details(&similar_ids).await;

        let included = slots.iter().filter(|slot| slot.is_some()).count();
        record_request(
            Flow::SimilarProducts,
            classify_outcome(included, similar_ids.len()),
        );

        let products: Vec<ProductDetail> = slots.into_iter().flatten().collect();
        tracing::info!("returning {} similar products for {product_id}", products.len());
        Ok(products)
    }

    /// Fan the detail lookups out and collate by original index, so the
    /// output order never depends on completion order. Lookups still in
    /// flight when the deadline fires are abandoned and counted as
    /// skipped errors.
    async fn fetch_details(&self, ids: &[String]) -> Vec<Option<ProductDetail>> {
        let mut slots: Vec<Option<ProductDetail>> = vec![None; ids.len()];
        if ids.is_empty() {
            return slots;
        }

        let mut join_set = JoinSet::new();
        for (index, id) in ids.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let id = id.clone();
            join_set.spawn(async move {
                let result = source.product_detail(&id).await;
                (index, id, result)
            });
        }

        let deadline = sleep(self.deadline);
        tokio::pin!(deadline);

        let mut unresolved = ids.len();
        while unresolved > 0 {
            tokio::select! {
                _ = &mut deadline => {
                    // Dropping the set aborts whatever is still in flight.
                    tracing::warn!("deadline hit with {unresolved} detail lookups unresolved");
                    for _ in 0..unresolved {
                        record_request(Flow::SimilarProducts, Outcome::SkippedError);
                    }
                    break;
                }
                joined = join_set.join_next() => {
                    match joined {
                        Some(Ok((index, id, result))) => {
                            unresolved -= 1;
                            match result {
                                Ok(detail) => slots[index] = Some(detail),
                                Err(CatalogError::NotFound) => {
                                    tracing::info!("product {id} not found, skipping");
                                    record_request(Flow::SimilarProducts, Outcome::SkippedNotFound);
                                }
                                Err(err) => {
                                    tracing::warn!("skipping product {id}: {err}");
                                    record_request(Flow::SimilarProducts, Outcome::SkippedError);
                                }
                            }
                        }
                        Some(Err(join_err)) => {
                            unresolved -= 1;
                            tracing::error!("detail lookup task failed: {join_err}");
                            record_request(Flow::SimilarProducts, Outcome::SkippedError);
                        }
                        None => break,
                    }
                }
            }
        }

        slots
    }
}

/// Exhaustive mapping from (included, requested) to the aggregate
/// outcome category.
pub fn classify_outcome(included: usize, requested: usize) -> Outcome {
    match (included, requested) {
        (0, _) => Outcome::Empty,
        (included, requested) if included == requested => Outcome::Success,
        _ => Outcome::PartialSuccess,
    }
}
