//! Periodic reconciliation of the live set against the registry.
//!
//! Change events are only a hint; if one is lost the live set would drift
//! forever. Every interval the router reloads the healthy set and converges
//! on it. A failed load leaves the live set untouched.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::discovery::bootstrap::load_healthy_backends;
use crate::health::Schedule;
use crate::load_balancer::BackendPool;
use crate::registry::{Registry, RegistryError};

/// Reload the healthy set once and apply it to `pool`.
pub async fn reconcile_once(registry: &dyn Registry, pool: &BackendPool) -> Result<(), RegistryError> {
    let healthy = load_healthy_backends(registry).await?;
    let (added, removed) = pool.reconcile(&healthy);

    if !added.is_empty() || !removed.is_empty() {
        tracing::info!(?added, ?removed, live = pool.len(), "Live set reconciled with registry");
    }
    Ok(())
}

pub struct Resync {
    registry: Arc<dyn Registry>,
    pool: Arc<BackendPool>,
    interval: Duration,
}

impl Resync {
    pub fn new(registry: Arc<dyn Registry>, pool: Arc<BackendPool>, interval: Duration) -> Self {
        Self {
            registry,
            pool,
            interval,
        }
    }

    pub async fn run(self, shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval = ?self.interval, "Resync task starting");
        let this = &self;
        Schedule::every(self.interval)
            .delayed()
            .run(
                move || async move {
                    if let Err(e) = reconcile_once(this.registry.as_ref(), &this.pool).await {
                        tracing::warn!(error = %e, "Resync failed, keeping current live set");
                    }
                },
                shutdown,
            )
            .await;
    }
}
