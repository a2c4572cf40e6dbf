//! Service runtime scaffolding library.
//!
//! Process lifecycle, a lazily-initialized component registry, concurrent
//! network endpoints and one error taxonomy rendered over HTTP and RPC.

pub mod app;
pub mod components;
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;

/// Type-erased error used at component and hook boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use config::schema::AppConfig;
pub use endpoint::Endpoint;
pub use errors::{Code, Error};
pub use lifecycle::Shutdown;
pub use registry::Registry;
