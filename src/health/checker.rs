//! Health-check cycle.
//!
//! # Responsibilities
//! - Sweep every backend id in the registry
//! - Probe each backend and derive its status
//! - On a transition: write `{status, last_checked}` and publish a change event
//!
//! Every failure is contained: a backend whose record cannot be read is
//! skipped for this cycle, and failed writes or publishes are only logged.
//! The next cycle re-derives everything from scratch.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::broadcast;

use crate::config::OrchestratorConfig;
use crate::health::probe::HttpProbe;
use crate::health::schedule::Schedule;
use crate::load_balancer::HealthStatus;
use crate::observability::metrics;
use crate::registry::{ChangeEvent, Registry};

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Backends probed.
    pub checked: usize,
    /// Backends skipped because their record could not be read.
    pub skipped: Vec<String>,
    /// Backends whose status differed from the registry, with the new status.
    pub transitions: Vec<(String, HealthStatus)>,
}

pub struct HealthChecker {
    registry: Arc<dyn Registry>,
    probe: HttpProbe,
}

impl HealthChecker {
    pub fn new(registry: Arc<dyn Registry>, config: &OrchestratorConfig) -> Self {
        Self {
            registry,
            probe: HttpProbe::new(config.health_path.clone(), config.probe_timeout()),
        }
    }

    /// Run cycles on `schedule` until shutdown.
    pub async fn run(self, schedule: Schedule, shutdown: broadcast::Receiver<()>) {
        tracing::info!(period = ?schedule.period(), "Health checker starting");
        let this = &self;
        schedule
            .run(
                move || async move {
                    this.run_cycle().await;
                },
                shutdown,
            )
            .await;
    }

    /// One full sweep over the registry.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();

        let ids = match self.registry.backend_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list backends, skipping cycle");
                return report;
            }
        };

        for id in ids {
            let record = match self.registry.fetch_backend(&id).await {
                Ok(Some(record)) => record,
                Ok(None) => {
                    tracing::warn!(backend = %id, "Backend has no record, skipping");
                    report.skipped.push(id);
                    continue;
                }
                Err(e) => {
                    tracing::warn!(backend = %id, error = %e, "Failed to read backend, skipping");
                    report.skipped.push(id);
                    continue;
                }
            };

            let Some(url) = record.url.as_deref() else {
                tracing::warn!(backend = %id, "Backend has no url, skipping");
                report.skipped.push(id);
                continue;
            };

            let status = self.probe.probe(url).await;
            report.checked += 1;
            metrics::record_backend_health(&id, status.is_healthy());

            if record.status != Some(status) {
                self.commit_transition(&id, record.status, status).await;
                report.transitions.push((id.clone(), status));
            }

            tracing::debug!(backend = %id, status = %status, "Backend checked");
        }

        metrics::record_health_cycle(started.elapsed());
        report
    }

    /// Best-effort write + publish; failures are left for the next cycle.
    async fn commit_transition(&self, id: &str, previous: Option<HealthStatus>, status: HealthStatus) {
        if let Err(e) = self.registry.write_status(id, status, unix_now()).await {
            tracing::warn!(backend = %id, error = %e, "Failed to write backend status");
        }

        if let Err(e) = self.registry.publish(&ChangeEvent::new(id, status)).await {
            tracing::warn!(backend = %id, error = %e, "Failed to publish change event");
        }

        tracing::info!(
            backend = %id,
            from = previous.map(|s| s.as_str()).unwrap_or("unknown"),
            to = %status,
            "Backend status changed"
        );
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
