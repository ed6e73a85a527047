use catalog::CatalogClient;
use clap::Parser;
use similar_products::aggregator::SimilarProducts;
use similar_products::api;
use similar_products::config::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "similar-products")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = config.validate() {
        eprintln!("invalid config: {err}");
        std::process::exit(1);
    }

    if let Some(metrics) = &config.metrics {
        if let Err(err) =
            shared::metrics::init_statsd(&metrics.statsd_host, metrics.statsd_port, &metrics.prefix)
        {
            eprintln!("failed to initialize metrics: {err}");
            std::process::exit(1);
        }
        shared::metrics::describe(shared::metrics_defs::ALL_METRICS);
        shared::metrics::describe(catalog::metrics_defs::ALL_METRICS);
    }

    let client = match CatalogClient::new(&config.catalog) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("failed to build catalog client: {err}");
            std::process::exit(1);
        }
    };

    let service = SimilarProducts::new(Arc::new(client), config.aggregation.deadline());

    if let Err(err) = api::serve(&config.listener, service).await {
        eprintln!("server error: {err}");
        std::process::exit(1);
    }
}
