use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The component's constructor failed. Every later access fails the same way.
    #[error("while load {name}: {source}")]
    Construction {
        name: String,
        #[source]
        source: Arc<dyn StdError + Send + Sync>,
    },

    #[error("component {name} is already registered")]
    Duplicate { name: String },

    #[error("component {name} is not registered")]
    Unknown { name: String },

    #[error("component {name} is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

impl RegistryError {
    /// A required component is unavailable; the process cannot serve.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RegistryError::Construction { .. })
    }
}
