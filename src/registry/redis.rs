//! Redis-backed registry.

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::load_balancer::backend::fields;
use crate::load_balancer::{BackendRecord, HealthStatus};
use crate::registry::{
    backend_key, ChangeEvent, EventStream, Registry, RegistryError, BACKENDS_SET, CHANGES_CHANNEL,
};

/// Registry stored in Redis.
///
/// Commands share one multiplexed connection; every subscription gets its own
/// pub/sub connection, closed when the returned stream is dropped.
#[derive(Clone)]
pub struct RedisRegistry {
    client: redis::Client,
    conn: MultiplexedConnection,
}

impl RedisRegistry {
    /// Connect to `redis://host:port`.
    pub async fn connect(url: &str) -> Result<Self, RegistryError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!(url = %url, "Connected to registry");
        Ok(Self { client, conn })
    }
}

#[async_trait]
impl Registry for RedisRegistry {
    async fn backend_ids(&self) -> Result<Vec<String>, RegistryError> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers(BACKENDS_SET).await?;
        Ok(ids)
    }

    async fn fetch_backend(&self, id: &str) -> Result<Option<BackendRecord>, RegistryError> {
        let mut conn = self.conn.clone();
        let hash: HashMap<String, String> = conn.hgetall(backend_key(id)).await?;
        if hash.is_empty() {
            return Ok(None);
        }
        Ok(Some(BackendRecord::from_fields(id, &hash)))
    }

    async fn write_status(
        &self,
        id: &str,
        status: HealthStatus,
        checked_at: i64,
    ) -> Result<(), RegistryError> {
        let mut conn = self.conn.clone();
        let items = [
            (fields::STATUS, status.as_str().to_string()),
            (fields::LAST_CHECKED, checked_at.to_string()),
        ];
        let _: () = conn.hset_multiple(backend_key(id), &items).await?;
        Ok(())
    }

    async fn publish(&self, event: &ChangeEvent) -> Result<(), RegistryError> {
        let payload = event.encode()?;
        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(CHANGES_CHANNEL, payload).await?;
        tracing::trace!(receivers, "Published change event");
        Ok(())
    }

    async fn subscribe(&self) -> Result<EventStream, RegistryError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(CHANGES_CHANNEL).await?;

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            match msg.get_payload::<String>() {
                Ok(payload) => Some(payload),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping non-text change payload");
                    None
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn register(&self, id: &str, url: &str) -> Result<(), RegistryError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.sadd(BACKENDS_SET, id).await?;
        let _: i64 = conn.hset(backend_key(id), fields::URL, url).await?;
        Ok(())
    }

    async fn deregister(&self, id: &str) -> Result<(), RegistryError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.srem(BACKENDS_SET, id).await?;
        let _: i64 = conn.del(backend_key(id)).await?;
        Ok(())
    }
}
