//! Reusable component descriptors.
//!
//! Each module exposes a `descriptor()` to hand to
//! [`Registry::register`](crate::registry::Registry::register) together with
//! the component's config section.

pub mod http_client;

pub use http_client::HttpClient;
