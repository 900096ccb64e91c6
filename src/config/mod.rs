//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → LbConfig (validated, immutable)
//!     → passed by value to each process's startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::LbConfig;
pub use schema::ObservabilityConfig;
pub use schema::OrchestratorConfig;
pub use schema::RegistryConfig;
pub use schema::RouterConfig;
pub use schema::WorkerConfig;
