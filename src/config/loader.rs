//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::LbConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {message}")]
    Env { name: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load the optional config file, apply process environment overrides, validate.
pub fn load(path: Option<&Path>) -> Result<LbConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => LbConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

/// Apply `NODE_ID`, `PORT`, `REGISTRY_URL`, `ROUTER_BIND` and `LOG_LEVEL`.
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut LbConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(node_id) = var("NODE_ID") {
        config.worker.node_id = node_id;
    }
    if let Some(port) = var("PORT") {
        config.worker.port = port.trim().parse().map_err(|e| ConfigError::Env {
            name: "PORT",
            message: format!("{:?}: {}", port, e),
        })?;
    }
    if let Some(url) = var("REGISTRY_URL") {
        config.registry.url = url;
    }
    if let Some(bind) = var("ROUTER_BIND") {
        config.router.bind_address = bind;
    }
    if let Some(level) = var("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    Ok(())
}
