//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or nothing
//!     → loader.rs (parse, deserialize, APP_PROFILE override)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! [components.<name>] tables
//!     → source.rs (TomlSource: one Scanner per component)
//!     → component constructor decodes its own type via ScanExt::scan
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Component sections stay opaque here; each component owns its schema

pub mod loader;
pub mod schema;
pub mod source;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, EndpointConfig, HttpConfig, LogFormat, LoggingConfig};
pub use source::{ScanError, ScanExt, Scanner, TomlSource};
