//! Network endpoints and their orchestration.
//!
//! # Data Flow
//! ```text
//! main.rs builds endpoints (HttpEndpoint, RpcEndpoint, ...)
//!     → run(): one task per endpoint, in order
//!              one shutdown hook per endpoint calling stop()
//!     → first run() to return decides the result
//!
//! Shutdown trigger
//!     → stop() on every endpoint (LIFO)
//!     → each run() returns EndpointError::Closed
//! ```
//!
//! # Design Decisions
//! - `run` returns as soon as any endpoint returns; the others keep serving
//!   until shutdown stops them
//! - A clean stop is `EndpointError::Closed`, which callers check with
//!   `is_closed()` instead of treating it as a failure
//! - A panicking endpoint is reported as an error, not propagated

mod error;
mod http;
mod rpc;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::sync::mpsc;

use crate::lifecycle::Shutdown;
use crate::observability::metrics;

pub use error::EndpointError;
pub use http::HttpEndpoint;
pub use rpc::RpcEndpoint;

/// One network listener.
#[async_trait]
pub trait Endpoint: Send + Sync {
    fn name(&self) -> String;

    /// Serve until stopped or failed.
    async fn run(&self) -> Result<(), EndpointError>;

    /// Ask `run` to return. Safe to call at any time, more than once.
    fn stop(&self) -> Result<(), EndpointError>;
}

/// Run every endpoint concurrently and return the first result.
pub async fn run(shutdown: &Shutdown, endpoints: Vec<Arc<dyn Endpoint>>) -> Result<(), EndpointError> {
    if endpoints.is_empty() {
        return Ok(());
    }

    let (tx, mut rx) = mpsc::channel(endpoints.len());
    for endpoint in endpoints {
        let name = endpoint.name();

        let stopper = Arc::clone(&endpoint);
        let hook_name = name.clone();
        shutdown.add_hook(name.clone(), move || {
            tracing::debug!(endpoint = %hook_name, "Stopping endpoint");
            stopper.stop().map_err(Into::into)
        });

        let tx = tx.clone();
        tracing::debug!(endpoint = %name, "Starting endpoint");
        tokio::spawn(async move {
            let result = match AssertUnwindSafe(endpoint.run()).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(EndpointError::Panicked { name: name.clone() }),
            };

            match &result {
                Ok(()) | Err(EndpointError::Closed) => {
                    tracing::info!(endpoint = %name, "Endpoint stopped");
                    metrics::record_endpoint_exit(&name, "closed");
                }
                Err(e) => {
                    tracing::error!(endpoint = %name, error = %e, "Endpoint failed");
                    metrics::record_endpoint_exit(&name, "error");
                }
            }
            let _ = tx.send(result).await;
        });
    }
    drop(tx);

    rx.recv().await.unwrap_or(Ok(()))
}
