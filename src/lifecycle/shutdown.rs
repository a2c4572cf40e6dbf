//! Shutdown coordination.
//!
//! # Responsibilities
//! - Collect named hooks from components, endpoints and tickers
//! - Run them once, most recently registered first, when triggered
//! - Let the composition root wait for completion with a bound
//!
//! # Design Decisions
//! - Hooks run on a dedicated OS thread so a blocking hook never stalls the runtime
//! - A failing or panicking hook is logged and the remaining hooks still run
//! - Hooks registered after the trigger are dropped with a warning

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::observability::metrics;
use crate::BoxError;

type Hook = Box<dyn FnOnce() -> Result<(), BoxError> + Send>;

struct Inner {
    hooks: Mutex<Vec<(String, Hook)>>,
    triggered: AtomicBool,
    done: watch::Sender<bool>,
}

/// Process-wide shutdown coordinator.
///
/// Cheap to clone; all clones share one hook list.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (done, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                hooks: Mutex::new(Vec::new()),
                triggered: AtomicBool::new(false),
                done,
            }),
        }
    }

    /// Register a hook to run on shutdown.
    pub fn add_hook<F>(&self, name: impl Into<String>, hook: F)
    where
        F: FnOnce() -> Result<(), BoxError> + Send + 'static,
    {
        let name = name.into();
        if self.is_triggered() {
            tracing::warn!(hook = %name, "Shutdown already triggered, hook dropped");
            return;
        }
        self.inner
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name, Box::new(hook)));
    }

    /// Start running hooks. Returns `false` if shutdown was already triggered.
    pub fn trigger(&self) -> bool {
        if self.inner.triggered.swap(true, Ordering::SeqCst) {
            return false;
        }

        let inner = Arc::clone(&self.inner);
        let spawned = std::thread::Builder::new()
            .name("shutdown".to_string())
            .spawn(move || inner.run_hooks());
        if let Err(e) = spawned {
            tracing::error!(error = %e, "Failed to spawn shutdown thread, running hooks inline");
            self.inner.run_hooks();
        }
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Wait until every hook has run.
    pub async fn wait(&self) {
        let mut done = self.inner.done.subscribe();
        // The sender lives as long as `self`, so this only returns once done.
        let _ = done.wait_for(|finished| *finished).await;
    }

    /// Like [`Shutdown::wait`], but gives up after `timeout`. Returns whether
    /// shutdown completed.
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn run_hooks(&self) {
        let start = Instant::now();
        let hooks = std::mem::take(&mut *self.hooks.lock().unwrap_or_else(PoisonError::into_inner));
        tracing::info!(hooks = hooks.len(), "Start shutdown");

        for (name, hook) in hooks.into_iter().rev() {
            let hook_start = Instant::now();
            match panic::catch_unwind(AssertUnwindSafe(hook)) {
                Ok(Ok(())) => tracing::debug!(hook = %name, "Shutdown hook finished"),
                Ok(Err(e)) => tracing::error!(hook = %name, error = %e, "Shutdown hook failed"),
                Err(_) => tracing::error!(hook = %name, "Shutdown hook panicked"),
            }
            metrics::record_hook(&name, hook_start.elapsed());
        }

        tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "Finish shutdown");
        self.done.send_replace(true);
    }
}
