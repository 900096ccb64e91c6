//! Shared backend registry.
//!
//! # Data Flow
//! ```text
//! Orchestrator
//!     → write_status(backend:{id}) + publish(backend_changes)
//!
//! Router
//!     → backend_ids + fetch_backend (initial load, resync)
//!     → subscribe(backend_changes) → event.rs decode → pool update
//! ```
//!
//! # Layout
//! - Set `backends`: backend ids
//! - Hash `backend:{id}`: `url`, `status`, `last_checked`
//! - Channel `backend_changes`: JSON `{"backend_id": .., "status": ..}`
//!
//! # Design Decisions
//! - The registry is the source of truth; events only speed up convergence
//! - Hash fields are read and written independently, no transactions
//! - Implementations: Redis for deployments, in-memory for tests and demos

pub mod event;
pub mod memory;
pub mod redis;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::load_balancer::{BackendRecord, HealthStatus};

pub use event::{ChangeEvent, EventError};
pub use memory::MemoryRegistry;
pub use self::redis::RedisRegistry;

/// Set holding every registered backend id.
pub const BACKENDS_SET: &str = "backends";

/// Pub/sub channel carrying [`ChangeEvent`] payloads.
pub const CHANGES_CHANNEL: &str = "backend_changes";

/// Hash key for a backend's record.
pub fn backend_key(id: &str) -> String {
    format!("backend:{}", id)
}

/// Raw payloads from the change channel. The stream ending means the
/// subscription was closed.
pub type EventStream = BoxStream<'static, String>;

/// Registry errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The narrow key-value + set + pub/sub contract the core relies on.
#[async_trait]
pub trait Registry: Send + Sync {
    /// All registered backend ids, in registry order.
    async fn backend_ids(&self) -> Result<Vec<String>, RegistryError>;

    /// The record of one backend, `None` if nothing is stored under its key.
    async fn fetch_backend(&self, id: &str) -> Result<Option<BackendRecord>, RegistryError>;

    /// Store a probe result.
    async fn write_status(
        &self,
        id: &str,
        status: HealthStatus,
        checked_at: i64,
    ) -> Result<(), RegistryError>;

    /// Publish a change event. Having no subscribers is not an error.
    async fn publish(&self, event: &ChangeEvent) -> Result<(), RegistryError>;

    /// Open a subscription to the change channel.
    async fn subscribe(&self) -> Result<EventStream, RegistryError>;

    /// Add a backend id to the set and store its URL.
    async fn register(&self, id: &str, url: &str) -> Result<(), RegistryError>;

    /// Remove a backend id and its record.
    async fn deregister(&self, id: &str) -> Result<(), RegistryError>;
}
