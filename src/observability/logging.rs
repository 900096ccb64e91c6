//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for every binary
//! - Respect `RUST_LOG`, fall back to the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Idempotent: tests may initialize it repeatedly

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("relay_lb={level},tower_http={level}", level = log_level))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
