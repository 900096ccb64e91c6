//! Router process.
//!
//! ```text
//!     Client ──GET /process──▶ ┌────────────────────────────┐ ──▶ worker b1
//!                              │ router                     │ ──▶ worker b2
//!                              │  live set + round robin    │ ──▶ ...
//!                              └────────────▲───────────────┘
//!                                           │ backend_changes (pub/sub)
//!                                           │ + periodic resync
//!                              ┌────────────┴───────────────┐
//!                              │ registry (redis)           │ ◀── orchestrator
//!                              └────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use relay_lb::config::loader;
use relay_lb::lifecycle::{spawn_signal_listener, start_router, Shutdown};
use relay_lb::observability::{logging, metrics};
use relay_lb::registry::RedisRegistry;

#[derive(Parser)]
#[command(name = "relay-lb", about = "Round-robin router over the registry's healthy workers")]
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
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "relay-lb router starting");

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let registry = Arc::new(RedisRegistry::connect(&config.registry.url).await?);

    let listener = TcpListener::bind(&config.router.bind_address).await?;
    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let handle = start_router(&config, registry, listener, &shutdown).await?;
    tracing::info!(address = %handle.local_addr, live = handle.pool.len(), "Router listening");

    handle.server.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
