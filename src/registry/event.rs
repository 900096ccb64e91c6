//! Change events carried on the `backend_changes` channel.

use serde::{Deserialize, Serialize};

use crate::load_balancer::HealthStatus;

/// A backend status transition.
///
/// `status` stays a string on the wire: anything other than `"healthy"` is
/// treated as "not healthy" by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub backend_id: String,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("invalid event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("event has an empty backend_id")]
    EmptyBackendId,
}

impl ChangeEvent {
    pub fn new(backend_id: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            backend_id: backend_id.into(),
            status: status.as_str().to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy.as_str()
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(payload: &str) -> Result<Self, EventError> {
        let event: ChangeEvent = serde_json::from_str(payload)?;
        if event.backend_id.is_empty() {
            return Err(EventError::EmptyBackendId);
        }
        Ok(event)
    }
}
