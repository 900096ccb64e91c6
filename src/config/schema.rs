//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure shared by the
//! router, orchestrator and worker binaries. All types derive Serde traits for
//! deserialization from config files, and every field has a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LbConfig {
    /// Shared registry connection.
    pub registry: RegistryConfig,

    /// Router (client-facing load balancer) settings.
    pub router: RouterConfig,

    /// Health-check orchestrator settings.
    pub orchestrator: OrchestratorConfig,

    /// Worker settings.
    pub worker: WorkerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Registry connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Redis URL (e.g., "redis://redis:6379").
    pub url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "redis://redis:6379".to_string(),
        }
    }
}

/// Router configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Upper bound on a forwarded request, in seconds. 0 disables the bound.
    pub forward_timeout_secs: u64,

    /// Full reconciliation against the registry, in seconds. 0 disables it.
    pub resync_interval_secs: u64,

    /// First delay before resubscribing after the change channel closes.
    pub resubscribe_base_delay_ms: u64,

    /// Cap on the resubscribe delay.
    pub resubscribe_max_delay_ms: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            forward_timeout_secs: 30,
            resync_interval_secs: 30,
            resubscribe_base_delay_ms: 200,
            resubscribe_max_delay_ms: 5_000,
        }
    }
}

impl RouterConfig {
    pub fn forward_timeout(&self) -> Option<Duration> {
        (self.forward_timeout_secs > 0).then(|| Duration::from_secs(self.forward_timeout_secs))
    }

    pub fn resync_interval(&self) -> Option<Duration> {
        (self.resync_interval_secs > 0).then(|| Duration::from_secs(self.resync_interval_secs))
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Health check cycle period in seconds.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub probe_timeout_secs: u64,

    /// Path to probe on every backend.
    pub health_path: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            probe_timeout_secs: 2,
            health_path: "/health".to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Identifier reported in `/process` responses.
    pub node_id: String,

    /// Listen port.
    pub port: u16,

    /// Lower bound of simulated processing time.
    pub min_latency_ms: u64,

    /// Upper bound (exclusive) of simulated processing time.
    pub max_latency_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            node_id: "backend-unknown".to_string(),
            port: 8080,
            min_latency_ms: 500,
            max_latency_ms: 2_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
