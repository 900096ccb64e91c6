//! Router-side view of the registry.
//!
//! # Data Flow
//! ```text
//! Startup (bootstrap.rs):
//!     subscribe → full load of healthy backends → seed live set
//!
//! Events (subscriber.rs):
//!     backend_changes → decode → add / remove in live set
//!
//! Backstop (resync.rs):
//!     every interval → full load → reconcile live set
//! ```

pub mod bootstrap;
pub mod resync;
pub mod subscriber;

pub use bootstrap::load_healthy_backends;
pub use resync::{reconcile_once, Resync};
pub use subscriber::{EventOutcome, EventSubscriber};
