//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::RouteTableError;

/// Environment variable prefix that defines or overrides a service target.
pub const TARGET_ENV_PREFIX: &str = "GATEWAY_TARGET_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}={value:?}: {reason}")]
    Env {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid route table: {0}")]
    Routes(#[from] RouteTableError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process environment
/// overrides and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let config = apply_env_overrides(config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `PORT`, `HOST` and `GATEWAY_TARGET_<NAME>` overrides.
///
/// `GATEWAY_TARGET_PRODUCT_SERVICE` maps to the service `product-service`.
pub fn apply_env_overrides<I>(mut config: GatewayConfig, vars: I) -> Result<GatewayConfig, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in vars {
        if name == "PORT" {
            config.listener.port = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Env {
                    name: name.clone(),
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        } else if name == "HOST" {
            config.listener.host = value;
        } else if let Some(service) = name.strip_prefix(TARGET_ENV_PREFIX) {
            if service.is_empty() {
                return Err(ConfigError::Env {
                    name,
                    value,
                    reason: "missing service name".to_string(),
                });
            }
            let service = service.to_lowercase().replace('_', "-");
            tracing::debug!(service = %service, target = %value, "Target overridden from environment");
            config.services.insert(service, value);
        }
    }

    Ok(config)
}
