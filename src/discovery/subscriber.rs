//! Change-event subscriber.
//!
//! # Responsibilities
//! - Consume change events one at a time, in delivery order
//! - Apply each event to the live set (add on "healthy", remove otherwise)
//! - Survive malformed payloads and closed subscriptions
//!
//! # Design Decisions
//! - Events are a hint: a "healthy" event for an absent backend only looks
//!   up the URL, the status is not re-verified
//! - A closed subscription is reopened with backoff, and the live set is
//!   reconciled afterwards because events may have been missed in between
//! - Shutdown drops the stream, which closes the subscription

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::broadcast;

use crate::config::RouterConfig;
use crate::discovery::resync::reconcile_once;
use crate::load_balancer::BackendPool;
use crate::observability::metrics;
use crate::registry::{ChangeEvent, EventStream, Registry};
use crate::resilience::backoff::Backoff;

/// What applying one payload did to the live set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Added,
    Removed,
    /// The live set already agreed with the event.
    Noop,
    /// A "healthy" event whose URL could not be resolved.
    Dropped,
    Malformed,
}

impl EventOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOutcome::Added => "added",
            EventOutcome::Removed => "removed",
            EventOutcome::Noop => "noop",
            EventOutcome::Dropped => "dropped",
            EventOutcome::Malformed => "malformed",
        }
    }
}

pub struct EventSubscriber {
    registry: Arc<dyn Registry>,
    pool: Arc<BackendPool>,
    backoff: Backoff,
}

impl EventSubscriber {
    pub fn new(registry: Arc<dyn Registry>, pool: Arc<BackendPool>, config: &RouterConfig) -> Self {
        Self {
            registry,
            pool,
            backoff: Backoff::new(
                config.resubscribe_base_delay_ms,
                config.resubscribe_max_delay_ms,
            ),
        }
    }

    /// Consume events until shutdown.
    ///
    /// `initial` is a subscription opened by the caller before the initial
    /// load, so nothing published in between is lost. Without one, the
    /// subscriber opens its own.
    pub async fn run(mut self, initial: Option<EventStream>, mut shutdown: broadcast::Receiver<()>) {
        let mut stream = match initial {
            Some(stream) => stream,
            None => match self.resubscribe(&mut shutdown).await {
                Some(stream) => stream,
                None => return,
            },
        };

        tracing::info!("Event subscriber started");

        loop {
            tokio::select! {
                next = stream.next() => match next {
                    Some(payload) => {
                        self.handle_payload(&payload).await;
                    }
                    None => {
                        tracing::error!("Change subscription closed, resubscribing");
                        stream = match self.resubscribe(&mut shutdown).await {
                            Some(stream) => stream,
                            None => break,
                        };
                        if let Err(e) = reconcile_once(self.registry.as_ref(), &self.pool).await {
                            tracing::warn!(error = %e, "Reconcile after resubscribe failed");
                        }
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Event subscriber shutting down");
                    break;
                }
            }
        }
    }

    /// Reopen the subscription, waiting out the backoff between attempts.
    /// Returns `None` if shutdown arrives first.
    async fn resubscribe(&mut self, shutdown: &mut broadcast::Receiver<()>) -> Option<EventStream> {
        loop {
            match self.registry.subscribe().await {
                Ok(stream) => {
                    if self.backoff.attempts() > 0 {
                        tracing::info!(attempts = self.backoff.attempts(), "Resubscribed to change events");
                    }
                    self.backoff.reset();
                    return Some(stream);
                }
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    tracing::warn!(error = %e, ?delay, "Subscribe failed, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = shutdown.recv() => return None,
                    }
                }
            }
        }
    }

    /// Decode and apply one raw payload. Malformed payloads are skipped.
    pub async fn handle_payload(&self, payload: &str) -> EventOutcome {
        let outcome = match ChangeEvent::decode(payload) {
            Ok(event) => self.apply(&event).await,
            Err(e) => {
                tracing::warn!(error = %e, payload = %payload, "Skipping malformed change event");
                EventOutcome::Malformed
            }
        };
        metrics::record_change_event(outcome.as_str());
        outcome
    }

    pub async fn apply(&self, event: &ChangeEvent) -> EventOutcome {
        let id = event.backend_id.as_str();

        if !event.is_healthy() {
            return if self.pool.remove(id) {
                tracing::info!(backend = %id, status = %event.status, live = self.pool.len(), "Backend removed");
                EventOutcome::Removed
            } else {
                EventOutcome::Noop
            };
        }

        if self.pool.contains(id) {
            return EventOutcome::Noop;
        }

        // Lookup happens outside the pool lock.
        let record = match self.registry.fetch_backend(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!(backend = %id, "Healthy event for unknown backend, dropping");
                return EventOutcome::Dropped;
            }
            Err(e) => {
                tracing::warn!(backend = %id, error = %e, "Failed to fetch backend url, dropping event");
                return EventOutcome::Dropped;
            }
        };

        let Some(backend) = record.to_backend() else {
            tracing::warn!(backend = %id, "Backend has no url, dropping event");
            return EventOutcome::Dropped;
        };

        if self.pool.add(backend) {
            tracing::info!(backend = %id, live = self.pool.len(), "Backend added");
            EventOutcome::Added
        } else {
            EventOutcome::Noop
        }
    }
}
