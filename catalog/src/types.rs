use serde::{Deserialize, Serialize};

/// Product detail as served by the upstream catalog. Value semantics:
/// built only from upstream payloads or the cache, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub availability: bool,
}
