//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single routable backend (id + base URL)
//! - Represent the authoritative registry record of a backend
//! - Define the health status vocabulary shared by router and orchestrator

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Health status as stored in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known health status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown health status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for HealthStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(HealthStatus::Healthy),
            "unhealthy" => Ok(HealthStatus::Unhealthy),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A backend entry in the router's live set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    /// Registry identifier, unique within the live set.
    pub id: String,
    /// Base URL, e.g. `http://worker-1:8080`.
    pub url: String,
}

impl Backend {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Build `{url}{path}` without doubling the slash.
    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.url, path)
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidBackendUrl {
    #[error("invalid backend url: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme {0:?}, expected http or https")]
    Scheme(String),
}

/// Check an operator-supplied base URL and return the form stored in the
/// registry: http(s) only, without trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String, InvalidBackendUrl> {
    let parsed = url::Url::parse(raw)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(InvalidBackendUrl::Scheme(parsed.scheme().to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Field names of the `backend:{id}` hash.
pub mod fields {
    pub const URL: &str = "url";
    pub const STATUS: &str = "status";
    pub const LAST_CHECKED: &str = "last_checked";
    pub const ACTIVE_CONNS: &str = "active_conns";
}

/// The registry's view of a backend.
///
/// Every field is optional because the hash fields are written independently
/// by different actors (registration writes `url`, the orchestrator writes
/// `status` and `last_checked`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendRecord {
    pub id: String,
    pub url: Option<String>,
    pub status: Option<HealthStatus>,
    pub last_checked: Option<i64>,
    /// Reserved for connection-aware balancing; not used by selection.
    pub active_conns: Option<u64>,
}

impl BackendRecord {
    /// Parse a record from raw hash fields.
    pub fn from_fields(id: &str, hash: &HashMap<String, String>) -> Self {
        Self {
            id: id.to_string(),
            url: hash.get(fields::URL).filter(|u| !u.is_empty()).cloned(),
            status: hash.get(fields::STATUS).and_then(|s| s.parse().ok()),
            last_checked: hash.get(fields::LAST_CHECKED).and_then(|s| s.parse().ok()),
            active_conns: hash.get(fields::ACTIVE_CONNS).and_then(|s| s.parse().ok()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == Some(HealthStatus::Healthy)
    }

    /// Convert to a live-set entry, if the record carries a URL.
    pub fn to_backend(&self) -> Option<Backend> {
        self.url.as_ref().map(|url| Backend::new(self.id.clone(), url.clone()))
    }
}
