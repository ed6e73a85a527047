use catalog::config::CatalogConfig;
use serde::Deserialize;
use std::fs::File;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Overall deadline for one aggregate request's fan-out phase.
    pub deadline_secs: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        AggregationConfig { deadline_secs: 30 }
    }
}

impl AggregationConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

fn default_metrics_prefix() -> String {
    "similar_products".into()
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    #[serde(flatten)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    pub metrics: Option<MetricsConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config = serde_yaml::from_reader(file)?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listener.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.catalog.validate()?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,
    #[error("invalid catalog config: {0}")]
    Catalog(#[from] catalog::config::ValidationError),
}
