pub mod breaker;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics_defs;
pub mod retry;
pub mod types;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use types::ProductDetail;
