//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! router, orchestrator, worker
//!     → logging.rs (tracing events with backend id / url / status fields)
//!     → metrics.rs (request counts, live set size, event outcomes, probe results)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint, when enabled
//! ```
//!
//! # Design Decisions
//! - Request IDs are assigned at the router edge and echoed to clients
//! - Metric calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
