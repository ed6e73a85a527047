use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("path template '{0}' must contain the {{productId}} placeholder")]
    MissingProductIdPlaceholder(String),

    #[error("path template '{0}' must start with '/'")]
    RelativePathTemplate(String),

    #[error("retry max_attempts must be at least 1")]
    ZeroRetryAttempts,

    #[error("failure_rate_threshold must be within (0, 1], got {0}")]
    InvalidFailureRateThreshold(f64),

    #[error("circuit breaker minimum_calls must be at least 1")]
    ZeroMinimumCalls,

    #[error("circuit breaker window_size must be at least minimum_calls")]
    WindowSmallerThanMinimumCalls,

    #[error("circuit breaker half_open_max_calls must be at least 1")]
    ZeroHalfOpenCalls,
}

/// Gateway configuration: the upstream endpoints plus every resilience
/// policy wrapped around them.
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogConfig {
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub detail_retry: RetryConfig,
    #[serde(default)]
    pub similar_ids_retry: RetryConfig,
    #[serde(default)]
    pub circuit_breaker: BreakerConfig,
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.upstream.validate()?;
        self.detail_retry.validate()?;
        self.similar_ids_retry.validate()?;
        self.circuit_breaker.validate()?;
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the catalog service.
    ///
    /// Note: uses `url::Url` so invalid URLs are rejected during config
    /// deserialization.
    pub base_url: Url,
    /// Path template for the similar-ids endpoint, e.g.
    /// `/product/{productId}/similarids`.
    pub similar_ids_path: String,
    /// Path template for the product-detail endpoint, e.g.
    /// `/product/{productId}`.
    pub product_detail_path: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl UpstreamConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for template in [&self.similar_ids_path, &self.product_detail_path] {
            if !template.starts_with('/') {
                return Err(ValidationError::RelativePathTemplate(template.clone()));
            }
            if !template.contains("{productId}") {
                return Err(ValidationError::MissingProductIdPlaceholder(
                    template.clone(),
                ));
            }
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// TTLs for the two cache namespaces. Each namespace expires on its own;
/// neither ever invalidates the other.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub product_detail_ttl_secs: u64,
    pub similar_ids_ttl_secs: u64,
    pub capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            product_detail_ttl_secs: 600,
            similar_ids_ttl_secs: 300,
            capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn product_detail_ttl(&self) -> Duration {
        Duration::from_secs(self.product_detail_ttl_secs)
    }

    pub fn similar_ids_ttl(&self) -> Duration {
        Duration::from_secs(self.similar_ids_ttl_secs)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 3,
            backoff_base_ms: 100,
            backoff_max_ms: 2_000,
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::ZeroRetryAttempts);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Failure ratio over the rolling window that opens the breaker.
    pub failure_rate_threshold: f64,
    /// Outcomes the window must hold before the ratio is evaluated.
    pub minimum_calls: usize,
    /// Size of the rolling outcome window.
    pub window_size: usize,
    pub open_duration_secs: u64,
    /// Trial calls admitted while half-open.
    pub half_open_max_calls: usize,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerConfig {
            failure_rate_threshold: 0.5,
            minimum_calls: 10,
            window_size: 20,
            open_duration_secs: 30,
            half_open_max_calls: 3,
        }
    }
}

impl BreakerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.failure_rate_threshold > 0.0 && self.failure_rate_threshold <= 1.0) {
            return Err(ValidationError::InvalidFailureRateThreshold(
                self.failure_rate_threshold,
            ));
        }
        if self.minimum_calls == 0 {
            return Err(ValidationError::ZeroMinimumCalls);
        }
        if self.window_size < self.minimum_calls {
            return Err(ValidationError::WindowSmallerThanMinimumCalls);
        }
        if self.half_open_max_calls == 0 {
            return Err(ValidationError::ZeroHalfOpenCalls);
        }
        Ok(())
    }

    pub fn open_duration(&self) -> Duration {
        Duration::from_secs(self.open_duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CatalogConfig {
        CatalogConfig {
            upstream: UpstreamConfig {
                base_url: Url::parse("http://catalog.internal:8080").unwrap(),
                similar_ids_path: "/product/{productId}/similarids".into(),
                product_detail_path: "/product/{productId}".into(),
                connect_timeout_secs: default_connect_timeout_secs(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            cache: CacheConfig::default(),
            detail_retry: RetryConfig::default(),
            similar_ids_retry: RetryConfig::default(),
            circuit_breaker: BreakerConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn path_template_must_contain_placeholder() {
        let mut config = base_config();
        config.upstream.product_detail_path = "/product/detail".into();
        assert_eq!(
            config.validate().unwrap_err(),
            ValidationError::MissingProductIdPlaceholder("/product/detail".into())
        );
    }

    #[test]
    fn path_template_must_be_absolute() {
        let mut config = base_config();
        config.upstream.similar_ids_path = "product/{productId}/similarids".into();
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::RelativePathTemplate(_)
        ));
    }

    #[test]
    fn breaker_threshold_must_be_a_ratio() {
        let mut config = base_config();
        config.circuit_breaker.failure_rate_threshold = 0.0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidFailureRateThreshold(_)
        ));

        config.circuit_breaker.failure_rate_threshold = 1.5;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidFailureRateThreshold(_)
        ));
    }

    #[test]
    fn window_must_cover_minimum_calls() {
        let mut config = base_config();
        config.circuit_breaker.minimum_calls = 30;
        assert_eq!(
            config.validate().unwrap_err(),
            ValidationError::WindowSmallerThanMinimumCalls
        );
    }

    #[test]
    fn retry_needs_at_least_one_attempt() {
        let mut config = base_config();
        config.detail_retry.max_attempts = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            ValidationError::ZeroRetryAttempts
        );
    }
}
