//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect enabled endpoints sharing one address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("endpoints.{endpoint}.address: invalid socket address {address:?}")]
    InvalidAddress { endpoint: &'static str, address: String },

    #[error("endpoints.{first} and endpoints.{second} both bind {address}")]
    AddressConflict {
        first: &'static str,
        second: &'static str,
        address: SocketAddr,
    },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("app.name must not be empty")]
    EmptyAppName,
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.app.name.trim().is_empty() {
        errors.push(ValidationError::EmptyAppName);
    }
    if config.shutdown.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "shutdown.timeout_secs",
        });
    }
    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "http.request_timeout_secs",
        });
    }

    let endpoints = [
        ("rest", &config.endpoints.rest),
        ("metrics", &config.endpoints.metrics),
        ("rpc", &config.endpoints.rpc),
    ];
    let mut bound: HashMap<SocketAddr, &'static str> = HashMap::new();
    for (name, endpoint) in endpoints.into_iter().filter(|(_, e)| e.enabled) {
        let Ok(address) = endpoint.address.parse::<SocketAddr>() else {
            errors.push(ValidationError::InvalidAddress {
                endpoint: name,
                address: endpoint.address.clone(),
            });
            continue;
        };
        // Port 0 asks the OS for a fresh port, so it never conflicts.
        if address.port() == 0 {
            continue;
        }
        if let Some(first) = bound.insert(address, name) {
            errors.push(ValidationError::AddressConflict {
                first,
                second: name,
                address,
            });
        }
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
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_problem() {
        let mut config = AppConfig::default();
        config.shutdown.timeout_secs = 0;
        config.endpoints.rest.address = "not-an-address".into();
        config.endpoints.rpc.address = config.endpoints.metrics.address.clone();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroTimeout {
            field: "shutdown.timeout_secs"
        }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::AddressConflict { second: "rpc", .. })));
    }

    #[test]
    fn test_disabled_endpoint_is_not_checked() {
        let mut config = AppConfig::default();
        config.endpoints.rpc.enabled = false;
        config.endpoints.rpc.address = "garbage".into();
        assert!(validate_config(&config).is_ok());
    }
}
