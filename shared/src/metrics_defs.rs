//! Common types for metrics definitions, plus the request-outcome
//! classification shared by every flow in the service.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

#[macro_export]
macro_rules! counter {
    ($def:expr) => {
        metrics::counter!($def.name)
    };
}

/// One counter for every classified request, tagged by flow and outcome.
pub const API_REQUESTS: MetricDef = MetricDef {
    name: "api.requests",
    metric_type: MetricType::Counter,
    description: "Classified request outcomes, tagged by flow and type",
};

pub const ALL_METRICS: &[MetricDef] = &[API_REQUESTS];

/// The logical call path a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    ProductDetail,
    SimilarIds,
    SimilarProducts,
}

impl Flow {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Flow::ProductDetail => "product-detail",
            Flow::SimilarIds => "similar-ids",
            Flow::SimilarProducts => "similar-products",
        }
    }
}

/// Closed set of request outcomes. Computed, never persisted; exists only
/// for the metrics side-channel and must not drive control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    PartialSuccess,
    Empty,
    NotFound,
    BadRequest,
    Error,
    Fallback,
    SkippedNotFound,
    SkippedError,
}

impl Outcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::PartialSuccess => "partial_success",
            Outcome::Empty => "empty",
            Outcome::NotFound => "not_found",
            Outcome::BadRequest => "bad_request",
            Outcome::Error => "error",
            Outcome::Fallback => "fallback",
            Outcome::SkippedNotFound => "skipped_not_found",
            Outcome::SkippedError => "skipped_error",
        }
    }
}

/// Increment the classified-request counter for one (flow, outcome) pair.
pub fn record_request(flow: Flow, outcome: Outcome) {
    metrics::counter!(
        API_REQUESTS.name,
        "flow" => flow.as_str(),
        "type" => outcome.as_str()
    )
    .increment(1);
}
