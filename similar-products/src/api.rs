use crate::aggregator::SimilarProducts;
use crate::config::Listener as ListenerConfig;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use catalog::{CatalogError, ProductDetail};
use serde::Serialize;
use shared::metrics_defs::{Flow, Outcome, record_request};
use tokio::net::TcpListener;

#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub async fn serve(listener: &ListenerConfig, service: SimilarProducts) -> Result<(), ServeError> {
    let app = router(service);
    let addr = format!("{}:{}", listener.host, listener.port);

    tracing::info!("listening on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(service: SimilarProducts) -> Router {
    Router::new()
        .route("/product/{product_id}/similar", get(similar_products))
        .route("/health", get(health))
        .with_state(service)
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

/// Failures surfaced to the end caller. Everything else is absorbed by
/// the aggregation pipeline before it reaches this layer.
enum ApiError {
    BadRequest(String),
    NotFound,
    Upstream { status: u16 },
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound => ApiError::NotFound,
            CatalogError::Upstream { status } => ApiError::Upstream { status },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, outcome) = match self {
            ApiError::BadRequest(message) => {
                tracing::warn!("bad request: {message}");
                (StatusCode::BAD_REQUEST, message, Outcome::BadRequest)
            }
            ApiError::NotFound => {
                tracing::info!("base product unknown, answering 404");
                (
                    StatusCode::NOT_FOUND,
                    "Product not found".to_string(),
                    Outcome::NotFound,
                )
            }
            ApiError::Upstream { status } => {
                tracing::error!("upstream failure surfaced to caller: status={status}");
                (
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    "Product API error".to_string(),
                    Outcome::Error,
                )
            }
        };

        record_request(Flow::SimilarProducts, outcome);
        let body = Json(ApiErrorResponse {
            error_message: message,
        });
        (status, body).into_response()
    }
}

async fn similar_products(
    State(service): State<SimilarProducts>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<ProductDetail>>, ApiError> {
    let product_id = product_id.trim();
    if product_id.is_empty() {
        return Err(ApiError::BadRequest(
            "the 'productId' parameter is required".to_string(),
        ));
    }

    let products = service.get_similar_products(product_id).await?;
    Ok(Json(products))
}

async fn health() -> StatusCode {
    StatusCode::OK
}
