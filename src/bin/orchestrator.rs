//! Orchestrator process: probes every registered worker on a fixed period.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use relay_lb::config::loader;
use relay_lb::lifecycle::{spawn_signal_listener, start_orchestrator, Shutdown};
use relay_lb::observability::{logging, metrics};
use relay_lb::registry::RedisRegistry;

#[derive(Parser)]
#[command(name = "orchestrator", about = "Health-checks workers and publishes status changes")]
struct Args {
    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = loader::load(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(
        interval_secs = config.orchestrator.interval_secs,
        probe_timeout_secs = config.orchestrator.probe_timeout_secs,
        "Orchestrator starting"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let registry = Arc::new(RedisRegistry::connect(&config.registry.url).await?);

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    start_orchestrator(&config, registry, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
