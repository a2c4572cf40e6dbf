//! Per-component configuration scanning.
//!
//! A component constructor never sees the whole [`AppConfig`]; it gets a
//! [`Scanner`] positioned at its own `[components.<name>]` table and decodes
//! it into whatever type it wants with [`ScanExt::scan`].
//!
//! [`AppConfig`]: crate::config::AppConfig

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("config section {section:?} is not a table")]
    NotATable { section: String },

    #[error("config section {section:?}: {source}")]
    Decode {
        section: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Read access to one component's raw configuration.
pub trait Scanner: Send + Sync {
    /// Section name, for error messages.
    fn section(&self) -> &str;

    fn raw(&self) -> Result<toml::Value, ScanError>;
}

/// Typed decoding on top of any [`Scanner`].
pub trait ScanExt: Scanner {
    fn scan<T: DeserializeOwned>(&self) -> Result<T, ScanError> {
        let value = self.raw()?;
        value.try_into::<T>().map_err(|source| ScanError::Decode {
            section: self.section().to_string(),
            source,
        })
    }
}

impl<S: Scanner + ?Sized> ScanExt for S {}

/// Scanner over a table of the loaded TOML document.
///
/// A missing section scans as an empty table, so types with
/// `#[serde(default)]` come out as their defaults.
#[derive(Debug, Clone)]
pub struct TomlSource {
    section: String,
    value: Option<toml::Value>,
}

impl TomlSource {
    /// Look up `name` in `root`; dots in `name` address nested tables.
    pub fn new(root: &toml::Table, name: &str) -> Self {
        let mut parts = name.split('.');
        let mut node = parts.next().and_then(|key| root.get(key));
        for key in parts {
            node = node.and_then(|n| n.get(key));
        }

        Self {
            section: name.to_string(),
            value: node.cloned(),
        }
    }

    pub fn empty(name: &str) -> Self {
        Self {
            section: name.to_string(),
            value: None,
        }
    }
}

impl Scanner for TomlSource {
    fn section(&self) -> &str {
        &self.section
    }

    fn raw(&self) -> Result<toml::Value, ScanError> {
        match &self.value {
            None => Ok(toml::Value::Table(toml::Table::new())),
            Some(value @ toml::Value::Table(_)) => Ok(value.clone()),
            Some(_) => Err(ScanError::NotATable {
                section: self.section.clone(),
            }),
        }
    }
}
