//! Startup orchestration.
//!
//! # Responsibilities
//! - Wire each process's subsystems together
//! - Start background tasks (subscriber, resync, health checks)
//! - Begin serving on an already-bound listener
//!
//! # Design Decisions
//! - Fail fast: a router that cannot subscribe or load its initial set does not start
//! - The subscription is opened before the initial load, so an event
//!   published during the load is still delivered afterwards
//! - Listeners are bound by the caller (tests pass `127.0.0.1:0`)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::LbConfig;
use crate::discovery::{load_healthy_backends, EventSubscriber, Resync};
use crate::health::{HealthChecker, Schedule};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::load_balancer::BackendPool;
use crate::registry::{Registry, RegistryError};
use crate::worker::{self, WorkerState};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("registry unavailable at startup: {0}")]
    Registry(#[from] RegistryError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// A running router.
pub struct RouterHandle {
    pub pool: Arc<BackendPool>,
    pub local_addr: SocketAddr,
    pub server: JoinHandle<Result<(), std::io::Error>>,
}

pub async fn start_router(
    config: &LbConfig,
    registry: Arc<dyn Registry>,
    listener: TcpListener,
    shutdown: &Shutdown,
) -> Result<RouterHandle, StartupError> {
    let local_addr = listener.local_addr()?;

    let events = registry.subscribe().await?;
    let initial = load_healthy_backends(registry.as_ref()).await?;
    tracing::info!(
        backends = initial.len(),
        ids = ?initial.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
        "Initial live set loaded"
    );
    let pool = Arc::new(BackendPool::with_backends(initial));

    let subscriber = EventSubscriber::new(registry.clone(), pool.clone(), &config.router);
    tokio::spawn(subscriber.run(Some(events), shutdown.subscribe()));

    match config.router.resync_interval() {
        Some(interval) => {
            let resync = Resync::new(registry.clone(), pool.clone(), interval);
            tokio::spawn(resync.run(shutdown.subscribe()));
        }
        None => tracing::info!("Periodic resync disabled"),
    }

    let server = HttpServer::new(pool.clone(), &config.router);
    let server = tokio::spawn(server.run(listener, shutdown.subscribe()));

    Ok(RouterHandle {
        pool,
        local_addr,
        server,
    })
}

pub fn start_orchestrator(config: &LbConfig, registry: Arc<dyn Registry>, shutdown: &Shutdown) -> JoinHandle<()> {
    let checker = HealthChecker::new(registry, &config.orchestrator);
    let schedule = Schedule::every(config.orchestrator.interval());
    tokio::spawn(checker.run(schedule, shutdown.subscribe()))
}

pub fn start_worker(
    config: &LbConfig,
    listener: TcpListener,
    shutdown: &Shutdown,
) -> Result<(SocketAddr, JoinHandle<Result<(), std::io::Error>>), StartupError> {
    let local_addr = listener.local_addr()?;
    let state = Arc::new(WorkerState::new(&config.worker));
    let app = worker::app(state);
    let mut stop = shutdown.subscribe();

    tracing::info!(address = %local_addr, node_id = %config.worker.node_id, "Worker starting");
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await
    });

    Ok((local_addr, server))
}
