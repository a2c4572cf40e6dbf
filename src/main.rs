//! Service skeleton: demo service composed from the runtime library.
//!
//! # Architecture Overview
//!
//! ```text
//!   config (TOML) ──▶ logging ──▶ Shutdown ◀── signals (SIGINT/SIGTERM)
//!                                    ▲
//!                                    │ hooks (LIFO)
//!        ┌───────────────────────────┼───────────────────────────┐
//!        │                           │                           │
//!   Registry ── HttpClient (peer)    │                     endpoint::run
//!        │                           │             ┌─────────────┼─────────────┐
//!        ▼                           │             ▼             ▼             ▼
//!   AppState ───────────────▶  rest (axum)   metrics (axum)   rpc (tonic)
//!                                 │
//!                                 ▼
//!                       errors::http envelope
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use service_skeleton::app::{self, AppState, UserDirectory};
use service_skeleton::components::http_client;
use service_skeleton::config::{loader, TomlSource};
use service_skeleton::endpoint::{self, Endpoint, HttpEndpoint, RpcEndpoint};
use service_skeleton::lifecycle::{signals, Shutdown};
use service_skeleton::observability::{logging, metrics};
use service_skeleton::registry::Registry;

/// Config section of the optional peer client.
const PEER: &str = "peer";

#[derive(Parser)]
#[command(name = "service-skeleton", version, about = "Demo service on the service runtime")]
struct Cli {
    /// Path to the TOML config file; defaults apply without one.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => loader::default_config()?,
    };

    logging::init(&config.logging);
    tracing::info!(
        app = %config.app.name,
        profile = %config.app.profile,
        "service-skeleton v0.1.0 starting"
    );

    let shutdown = Shutdown::new();
    signals::spawn_listener(shutdown.clone());
    let registry = Registry::new(shutdown.clone());

    let peer = if config.components.contains_key(PEER) {
        let source = TomlSource::new(&config.components, PEER);
        match registry
            .register(PEER, http_client::descriptor(), source, false)
            .and_then(|provider| provider.get())
        {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::error!(error = %e, fatal = e.is_fatal(), "Failed to load component");
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    let mut endpoints: Vec<Arc<dyn Endpoint>> = Vec::new();
    let listen = &config.endpoints;

    let users = Arc::new(UserDirectory::new());

    if listen.rest.enabled {
        let state = AppState {
            users: Arc::clone(&users),
            peer,
        };
        let router = service_skeleton::http::layered(app::router(state), &config.http);
        endpoints.push(Arc::new(HttpEndpoint::new("rest", &listen.rest.address, router)));
    }

    if listen.metrics.enabled {
        match metrics::install() {
            Ok(handle) => endpoints.push(Arc::new(HttpEndpoint::new(
                "metrics",
                &listen.metrics.address,
                metrics::router(handle),
            ))),
            Err(e) => tracing::warn!(error = %e, "Metrics recorder not installed, metrics endpoint disabled"),
        }
    }

    if listen.rpc.enabled {
        endpoints.push(Arc::new(RpcEndpoint::new("app", &listen.rpc.address, app::rpc::routes(users))));
    }

    tracing::info!(endpoints = endpoints.len(), components = ?registry.names(), "Starting endpoints");

    let mut failure = None;
    match endpoint::run(&shutdown, endpoints).await {
        Ok(()) => {
            tracing::info!("No endpoint enabled, waiting for shutdown signal");
            shutdown.wait().await;
        }
        Err(e) if e.is_closed() => {}
        Err(e) => {
            tracing::error!(error = %e, "Endpoint failed, shutting down");
            shutdown.trigger();
            failure = Some(e);
        }
    }

    let timeout_secs = config.shutdown.timeout_secs;
    if !shutdown.wait_timeout(Duration::from_secs(timeout_secs)).await {
        tracing::warn!(timeout_secs, "Shutdown hooks did not finish in time");
    }
    tracing::info!("Shutdown complete");

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
