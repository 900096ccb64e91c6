//! Health checking subsystem (the orchestrator's core).
//!
//! # Data Flow
//! ```text
//! schedule.rs (fixed period, serial runs)
//!     → checker.rs: list backend ids from the registry
//!     → for each id: read url + previous status
//!     → probe.rs: GET {url}/health with a hard timeout
//!     → status differs? write registry + publish change event
//! ```
//!
//! # Design Decisions
//! - Exactly HTTP 200 is healthy; errors, timeouts and other codes are not
//! - Unchanged status is not rewritten or republished
//! - Failures never stop the loop; the next cycle retries naturally

pub mod checker;
pub mod probe;
pub mod schedule;

pub use checker::{CycleReport, HealthChecker};
pub use probe::HttpProbe;
pub use schedule::Schedule;
