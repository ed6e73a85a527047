use thiserror::Error;

/// Failures the upstream catalog can surface for a single-item call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The upstream answered 404: a definitive absence, not a fault.
    #[error("product not found")]
    NotFound,

    /// Any other non-2xx answer or a transport failure. `status` carries
    /// the upstream status, or 500 when none was available.
    #[error("catalog upstream error: status={status}")]
    Upstream { status: u16 },
}

impl CatalogError {
    /// Only transport-level and 5xx failures are worth retrying; anything
    /// the upstream answered definitively is not.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::NotFound => false,
            CatalogError::Upstream { status } => *status >= 500,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16()).unwrap_or(500);
        CatalogError::Upstream { status }
    }
}
