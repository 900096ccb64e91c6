//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call (probe / forward):
//!     → timeouts.rs (enforce deadline)
//!
//! Change-channel subscription closed:
//!     → backoff.rs (exponential delay with jitter before resubscribing)
//! ```
//!
//! # Design Decisions
//! - Health probes always carry a deadline; forwards carry a configurable one
//! - Forwarded requests are single-attempt: no retry, no failover
//! - Jittered backoff keeps many routers from resubscribing in lockstep

pub mod backoff;
pub mod timeouts;
