//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT / SIGTERM
//! - Trigger the shutdown coordinator on the first one
//! - Force exit on the second one
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Exit status used when a second signal cuts shutdown short.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawn the signal listener task.
pub fn spawn_listener(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(signal) => tracing::info!(signal, "Shutdown signal received"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
                return;
            }
        }
        shutdown.trigger();

        if let Ok(signal) = wait_for_signal().await {
            tracing::warn!(signal, "Second shutdown signal received, forcing exit");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "ctrl-c")
}
