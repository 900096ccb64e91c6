//! Worker process.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use relay_lb::config::loader;
use relay_lb::lifecycle::{spawn_signal_listener, start_worker, Shutdown};
use relay_lb::observability::logging;

#[derive(Parser)]
#[command(name = "worker", about = "Simulated worker answering /process and /health")]
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

    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config.worker.port))).await?;
    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let (addr, server) = start_worker(&config, listener, &shutdown)?;
    tracing::info!(address = %addr, node_id = %config.worker.node_id, "Worker listening");

    server.await??;
    Ok(())
}
