//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Client request
//!     → pool.rs (lock, pick next live backend, unlock)
//!     → round_robin.rs (rotate through the ordered live set)
//!     → backend.rs (id + base URL to forward to)
//!
//! Registry change
//!     → pool.rs (lock, add / remove / reconcile, unlock)
//! ```
//!
//! # Design Decisions
//! - Live set and cursor are one lock-guarded unit
//! - Selection is pure round-robin; no connection or latency awareness
//! - The live set only ever contains backends the registry reported healthy

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::{Backend, BackendRecord, HealthStatus};
pub use pool::BackendPool;
