use crate::metrics_defs::{MetricDef, MetricType};
use metrics_exporter_statsd::{StatsdBuilder, StatsdError, StatsdRecorder};

#[derive(thiserror::Error, Debug)]
pub enum MetricsError {
    #[error("failed to build statsd recorder: {0}")]
    Statsd(#[from] StatsdError),
    #[error("failed to install metrics recorder: {0}")]
    Install(#[from] metrics::SetRecorderError<StatsdRecorder>),
}

/// Install a global StatsD recorder. Callers that skip this get the
/// default no-op recorder, so metric macros stay safe to call anywhere.
pub fn init_statsd(host: &str, port: u16, prefix: &str) -> Result<(), MetricsError> {
    let recorder = StatsdBuilder::from(host, port).build(Some(prefix))?;
    metrics::set_global_recorder(recorder)?;
    Ok(())
}

/// Register descriptions for a table of metric definitions.
pub fn describe(defs: &[MetricDef]) {
    for def in defs {
        match def.metric_type {
            MetricType::Counter => metrics::describe_counter!(def.name, def.description),
            MetricType::Gauge => metrics::describe_gauge!(def.name, def.description),
            MetricType::Histogram => metrics::describe_histogram!(def.name, def.description),
        }
    }
}
