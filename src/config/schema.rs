//! Configuration schema definitions.
//!
//! Every section has defaults, so an empty file (or no file) yields a
//! runnable service.

use serde::{Deserialize, Serialize};

/// Root configuration for a service instance.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub logging: LoggingConfig,
    pub shutdown: ShutdownConfig,
    pub http: HttpConfig,
    pub endpoints: EndpointsConfig,

    /// Opaque per-component tables, handed to constructors as scanners.
    pub components: toml::Table,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub profile: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "demo".to_string(),
            profile: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,tower_http=debug".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long main waits for shutdown hooks before exiting anyway.
    pub timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

/// One network listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    pub address: String,
}

fn enabled() -> bool {
    true
}

impl EndpointConfig {
    fn on(address: &str) -> Self {
        Self {
            enabled: true,
            address: address.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub rest: EndpointConfig,
    pub metrics: EndpointConfig,
    pub rpc: EndpointConfig,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            rest: EndpointConfig::on("0.0.0.0:8080"),
            metrics: EndpointConfig::on("0.0.0.0:8081"),
            rpc: EndpointConfig::on("0.0.0.0:8082"),
        }
    }
}
