//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Bind listener → subscribe → initial load → spawn tasks → serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → every task leaves its loop → servers drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{shutdown_signal, spawn_signal_listener};
pub use startup::{start_orchestrator, start_router, start_worker, RouterHandle, StartupError};
