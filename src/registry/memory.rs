//! In-process registry.
//!
//! Behaves like the Redis layout (ordered set of ids, one field map per
//! backend, a broadcast channel for pub/sub) and can inject failures, which
//! makes it the registry of choice for tests and single-process demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::sync::broadcast;

use crate::load_balancer::backend::fields;
use crate::load_balancer::{BackendRecord, HealthStatus};
use crate::registry::{ChangeEvent, EventStream, Registry, RegistryError};

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct Store {
    /// Set members in insertion order.
    members: Vec<String>,
    hashes: HashMap<String, HashMap<String, String>>,
}

/// A registry held entirely in memory.
#[derive(Debug)]
pub struct MemoryRegistry {
    store: Mutex<Store>,
    channel: Mutex<broadcast::Sender<String>>,
    available: AtomicBool,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRegistry {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            store: Mutex::new(Store::default()),
            channel: Mutex::new(tx),
            available: AtomicBool::new(true),
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sender(&self) -> MutexGuard<'_, broadcast::Sender<String>> {
        self.channel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), RegistryError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RegistryError::Unavailable("memory registry offline".into()))
        }
    }

    /// Make every subsequent call fail (`false`) or succeed again (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Close every open subscription. New subscriptions work as before.
    pub fn disconnect_subscribers(&self) {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        *self.sender() = tx;
    }

    /// Set a single hash field, adding the id to the set as a side effect.
    pub fn set_field(&self, id: &str, field: &str, value: &str) {
        let mut store = self.store();
        if !store.members.iter().any(|m| m == id) {
            store.members.push(id.to_string());
        }
        store
            .hashes
            .entry(id.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    /// Register a backend together with a status, as a seeded fixture.
    pub fn insert_backend(&self, id: &str, url: &str, status: HealthStatus) {
        self.set_field(id, fields::URL, url);
        self.set_field(id, fields::STATUS, status.as_str());
    }

    /// Publish a raw payload, bypassing the event codec.
    pub fn publish_raw(&self, payload: &str) -> usize {
        self.sender().send(payload.to_string()).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender().receiver_count()
    }

    /// Read one raw hash field.
    pub fn field(&self, id: &str, field: &str) -> Option<String> {
        self.store()
            .hashes
            .get(id)
            .and_then(|h| h.get(field))
            .cloned()
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn backend_ids(&self) -> Result<Vec<String>, RegistryError> {
        self.check_available()?;
        Ok(self.store().members.clone())
    }

    async fn fetch_backend(&self, id: &str) -> Result<Option<BackendRecord>, RegistryError> {
        self.check_available()?;
        Ok(self
            .store()
            .hashes
            .get(id)
            .filter(|h| !h.is_empty())
            .map(|h| BackendRecord::from_fields(id, h)))
    }

    async fn write_status(
        &self,
        id: &str,
        status: HealthStatus,
        checked_at: i64,
    ) -> Result<(), RegistryError> {
        self.check_available()?;
        let mut store = self.store();
        let hash = store.hashes.entry(id.to_string()).or_default();
        hash.insert(fields::STATUS.to_string(), status.as_str().to_string());
        hash.insert(fields::LAST_CHECKED.to_string(), checked_at.to_string());
        Ok(())
    }

    async fn publish(&self, event: &ChangeEvent) -> Result<(), RegistryError> {
        self.check_available()?;
        let payload = event.encode()?;
        self.publish_raw(&payload);
        Ok(())
    }

    async fn subscribe(&self) -> Result<EventStream, RegistryError> {
        self.check_available()?;
        let rx = self.sender().subscribe();

        let stream = stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(payload) => return Some((payload, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Subscriber lagged, change events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn register(&self, id: &str, url: &str) -> Result<(), RegistryError> {
        self.check_available()?;
        self.set_field(id, fields::URL, url);
        Ok(())
    }

    async fn deregister(&self, id: &str) -> Result<(), RegistryError> {
        self.check_available()?;
        let mut store = self.store();
        store.members.retain(|m| m != id);
        store.hashes.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_semantics_and_order() {
        let registry = MemoryRegistry::new();
        registry.register("b2", "http://b2").await.unwrap();
        registry.register("b1", "http://b1").await.unwrap();
        registry.register("b2", "http://b2-moved").await.unwrap();

        assert_eq!(registry.backend_ids().await.unwrap(), vec!["b2", "b1"]);
        let record = registry.fetch_backend("b2").await.unwrap().unwrap();
        assert_eq!(record.url.as_deref(), Some("http://b2-moved"));
        assert_eq!(record.status, None);
    }

    #[tokio::test]
    async fn test_write_status_and_deregister() {
        let registry = MemoryRegistry::new();
        registry.register("b1", "http://b1").await.unwrap();
        registry
            .write_status("b1", HealthStatus::Healthy, 42)
            .await
            .unwrap();

        let record = registry.fetch_backend("b1").await.unwrap().unwrap();
        assert!(record.is_healthy());
        assert_eq!(record.last_checked, Some(42));

        registry.deregister("b1").await.unwrap();
        assert!(registry.fetch_backend("b1").await.unwrap().is_none());
        assert!(registry.backend_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers_in_order() {
        let registry = MemoryRegistry::new();
        let mut events = registry.subscribe().await.unwrap();

        registry
            .publish(&ChangeEvent::new("b1", HealthStatus::Healthy))
            .await
            .unwrap();
        registry
            .publish(&ChangeEvent::new("b1", HealthStatus::Unhealthy))
            .await
            .unwrap();

        assert_eq!(
            events.next().await.unwrap(),
            r#"{"backend_id":"b1","status":"healthy"}"#
        );
        assert_eq!(
            events.next().await.unwrap(),
            r#"{"backend_id":"b1","status":"unhealthy"}"#
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let registry = MemoryRegistry::new();
        registry
            .publish(&ChangeEvent::new("b1", HealthStatus::Healthy))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_ends_streams() {
        let registry = MemoryRegistry::new();
        let mut events = registry.subscribe().await.unwrap();
        registry.disconnect_subscribers();
        assert!(events.next().await.is_none());
        assert_eq!(registry.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_registry_fails_every_call() {
        let registry = MemoryRegistry::new();
        registry.set_available(false);

        assert!(matches!(
            registry.backend_ids().await,
            Err(RegistryError::Unavailable(_))
        ));
        assert!(registry.fetch_backend("b1").await.is_err());
        assert!(registry.subscribe().await.is_err());

        registry.set_available(true);
        assert!(registry.backend_ids().await.is_ok());
    }
}
