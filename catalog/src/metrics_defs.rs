//! Metrics definitions for the catalog gateway.

use shared::metrics_defs::{MetricDef, MetricType};

pub const DETAIL_CACHE_HIT: MetricDef = MetricDef {
    name: "cache.product_detail.hit",
    metric_type: MetricType::Counter,
    description: "Product-detail lookups served from the cache",
};

pub const DETAIL_CACHE_MISS: MetricDef = MetricDef {
    name: "cache.product_detail.miss",
    metric_type: MetricType::Counter,
    description: "Product-detail lookups that went to the upstream",
};

pub const SIMILAR_IDS_CACHE_HIT: MetricDef = MetricDef {
    name: "cache.similar_ids.hit",
    metric_type: MetricType::Counter,
    description: "Similar-ids lookups served from the cache",
};

pub const SIMILAR_IDS_CACHE_MISS: MetricDef = MetricDef {
    name: "cache.similar_ids.miss",
    metric_type: MetricType::Counter,
    description: "Similar-ids lookups that went to the upstream",
};

pub const BREAKER_OPENED: MetricDef = MetricDef {
    name: "circuit_breaker.opened",
    metric_type: MetricType::Counter,
    description: "Transitions of the similar-ids circuit breaker to open",
};

pub const ALL_METRICS: &[MetricDef] = &[
    DETAIL_CACHE_HIT,
    DETAIL_CACHE_MISS,
    SIMILAR_IDS_CACHE_HIT,
    SIMILAR_IDS_CACHE_MISS,
    BREAKER_OPENED,
];
