//! Lazily-initialized component slots and their accessors.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use crate::config::Scanner;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::registry::descriptor::{CreatedContext, Descriptor};
use crate::registry::error::RegistryError;
use crate::BoxError;

type Shared<T> = Result<Arc<T>, Arc<dyn std::error::Error + Send + Sync>>;

pub(crate) struct Slot<T> {
    full_name: String,
    descriptor: Descriptor<T>,
    source: Box<dyn Scanner>,
    shutdown: Shutdown,
    cell: OnceLock<Shared<T>>,
}

impl<T: Send + Sync + 'static> Slot<T> {
    pub(crate) fn new(full_name: String, descriptor: Descriptor<T>, source: Box<dyn Scanner>, shutdown: Shutdown) -> Self {
        Self {
            full_name,
            descriptor,
            source,
            shutdown,
            cell: OnceLock::new(),
        }
    }

    fn get(&self) -> Result<Arc<T>, RegistryError> {
        match self.cell.get_or_init(|| self.construct()) {
            Ok(value) => Ok(Arc::clone(value)),
            Err(source) => Err(RegistryError::Construction {
                name: self.full_name.clone(),
                source: Arc::clone(source),
            }),
        }
    }

    fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    fn construct(&self) -> Shared<T> {
        tracing::debug!(component = %self.full_name, "Loading component");

        let value = match (self.descriptor.create)(self.source.as_ref()) {
            Ok(value) => Arc::new(value),
            Err(e) => return Err(self.failed(e)),
        };

        // A panic here must still settle the cell, or the next access would
        // run `create` a second time.
        if let Some(on_created) = &self.descriptor.on_created {
            let ctx = CreatedContext {
                full_name: self.full_name.clone(),
                shutdown: self.shutdown.clone(),
            };
            if panic::catch_unwind(AssertUnwindSafe(|| on_created(&ctx, &value))).is_err() {
                return Err(self.failed("on_created hook panicked".into()));
            }
        }
        metrics::record_construction(&self.full_name, true);
        tracing::debug!(component = %self.full_name, "Loaded component");

        if let Some(on_destroy) = self.descriptor.on_destroy.clone() {
            let name = self.full_name.clone();
            let target = Arc::clone(&value);
            self.shutdown.add_hook(self.full_name.clone(), move || -> Result<(), BoxError> {
                tracing::debug!(component = %name, "Destroying component");
                on_destroy(target)?;
                tracing::debug!(component = %name, "Destroyed component");
                Ok(())
            });
        }

        Ok(value)
    }

    fn failed(&self, e: BoxError) -> Arc<dyn std::error::Error + Send + Sync> {
        tracing::error!(component = %self.full_name, error = %e, "Failed to load component");
        metrics::record_construction(&self.full_name, false);
        Arc::from(e)
    }
}

/// Accessor for one registered component.
///
/// The first `get` on a lazy component constructs it; concurrent callers
/// wait for that single construction and all observe its outcome.
pub struct Provider<T> {
    slot: Arc<Slot<T>>,
}

impl<T: Send + Sync + 'static> Provider<T> {
    pub(crate) fn new(slot: Arc<Slot<T>>) -> Self {
        Self { slot }
    }

    pub fn get(&self) -> Result<Arc<T>, RegistryError> {
        self.slot.get()
    }

    pub fn full_name(&self) -> &str {
        &self.slot.full_name
    }

    /// Whether construction has already happened (successfully or not).
    pub fn is_initialized(&self) -> bool {
        self.slot.is_initialized()
    }
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> std::fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("component", &self.slot.full_name).finish()
    }
}
