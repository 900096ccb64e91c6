//! Registry-driven round-robin load balancer.
//!
//! Three processes share one registry:
//! - the **orchestrator** probes every registered worker and publishes status changes
//! - the **router** keeps a live set of healthy workers in sync with those changes
//!   and forwards each client request to the next one in rotation
//! - **workers** answer `/process` and `/health`

pub mod admin;
pub mod config;
pub mod discovery;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod registry;
pub mod resilience;
pub mod worker;

pub use config::LbConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Backend, BackendPool, HealthStatus};
pub use registry::{MemoryRegistry, RedisRegistry, Registry};
