//! Full load of the healthy backend set from the registry.

use crate::load_balancer::Backend;
use crate::registry::{Registry, RegistryError};

/// Read every registered backend and keep the healthy ones, in registry order.
///
/// Failing to list the backend set is an error. A single record that cannot
/// be read, or that has no URL, is skipped with a warning.
pub async fn load_healthy_backends(registry: &dyn Registry) -> Result<Vec<Backend>, RegistryError> {
    let ids = registry.backend_ids().await?;
    let mut healthy: Vec<Backend> = Vec::with_capacity(ids.len());

    for id in ids {
        let record = match registry.fetch_backend(&id).await {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(backend = %id, error = %e, "Failed to read backend during load");
                continue;
            }
        };

        if !record.is_healthy() {
            continue;
        }

        match record.to_backend() {
            Some(backend) if !healthy.iter().any(|b| b.id == backend.id) => healthy.push(backend),
            Some(_) => {}
            None => tracing::warn!(backend = %id, "Healthy backend has no url, ignoring"),
        }
    }

    Ok(healthy)
}
