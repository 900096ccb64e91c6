//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LbConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::LbConfig;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &LbConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.registry.url) {
        Ok(url) if matches!(url.scheme(), "redis" | "rediss") => {}
        Ok(url) => errors.push(ValidationError::new(
            "registry.url",
            format!("unsupported scheme {:?}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("registry.url", e.to_string())),
    }

    if config.router.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "router.bind_address",
            format!("not a socket address: {:?}", config.router.bind_address),
        ));
    }
    if config.router.resubscribe_base_delay_ms > config.router.resubscribe_max_delay_ms {
        errors.push(ValidationError::new(
            "router.resubscribe_base_delay_ms",
            "must not exceed resubscribe_max_delay_ms",
        ));
    }

    if config.orchestrator.interval_secs == 0 {
        errors.push(ValidationError::new("orchestrator.interval_secs", "must be > 0"));
    }
    if config.orchestrator.probe_timeout_secs == 0 {
        errors.push(ValidationError::new("orchestrator.probe_timeout_secs", "must be > 0"));
    }
    if !config.orchestrator.health_path.starts_with('/') {
        errors.push(ValidationError::new(
            "orchestrator.health_path",
            "must start with '/'",
        ));
    }

    if config.worker.node_id.trim().is_empty() {
        errors.push(ValidationError::new("worker.node_id", "must not be empty"));
    }
    if config.worker.min_latency_ms > config.worker.max_latency_ms {
        errors.push(ValidationError::new(
            "worker.min_latency_ms",
            "must not exceed max_latency_ms",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {:?}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&LbConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = LbConfig::default();
        config.registry.url = "http://redis:6379".into();
        config.router.bind_address = "nowhere".into();
        config.orchestrator.interval_secs = 0;
        config.orchestrator.health_path = "health".into();
        config.worker.min_latency_ms = 10;
        config.worker.max_latency_ms = 5;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "registry.url",
                "router.bind_address",
                "orchestrator.interval_secs",
                "orchestrator.health_path",
                "worker.min_latency_ms",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = LbConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
