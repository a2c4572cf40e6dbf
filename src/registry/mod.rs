//! Component registry.
//!
//! # Data Flow
//! ```text
//! main.rs
//!     → Registry::register(name, Descriptor, TomlSource, lazy)
//!         eager: construct now (fatal error surfaces immediately)
//!         lazy:  construct on first Provider::get
//!     → construct: create(scanner) → on_created(ctx, &value)
//!                  → shutdown hook calling on_destroy(value)
//!     → Provider<T>::get() → Arc<T> singleton
//! ```
//!
//! # Design Decisions
//! - The registry is an explicit object owned by the composition root
//! - Exactly-once construction through `OnceLock`, never a checked flag
//! - A construction failure is stored and returned to every accessor as a
//!   fatal [`RegistryError::Construction`]
//! - Components are shared read-only as `Arc<T>`

mod descriptor;
mod error;
mod provider;

use std::any::{type_name, Any};
use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};

use crate::config::Scanner;
use crate::lifecycle::Shutdown;

pub use descriptor::{CreatedContext, Descriptor};
pub use error::RegistryError;
pub use provider::Provider;

use provider::Slot;

/// Named component singletons, keyed by full name `"<Descriptor> (<name>)"`.
pub struct Registry {
    shutdown: Shutdown,
    slots: DashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Registry {
    pub fn new(shutdown: Shutdown) -> Self {
        Self {
            shutdown,
            slots: DashMap::new(),
        }
    }

    /// Register a component instance.
    ///
    /// With `lazy == false` the component is constructed before this returns
    /// and a construction failure is returned here.
    pub fn register<T, S>(
        &self,
        name: &str,
        descriptor: Descriptor<T>,
        source: S,
        lazy: bool,
    ) -> Result<Provider<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        S: Scanner + 'static,
    {
        let full_name = descriptor.full_name(name);
        let slot = Arc::new(Slot::new(
            full_name.clone(),
            descriptor,
            Box::new(source),
            self.shutdown.clone(),
        ));

        match self.slots.entry(full_name.clone()) {
            Entry::Occupied(_) => return Err(RegistryError::Duplicate { name: full_name }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&slot) as Arc<dyn Any + Send + Sync>);
            }
        }
        tracing::debug!(component = %full_name, lazy, "Registered component");

        let provider = Provider::new(slot);
        if !lazy {
            provider.get()?;
        }
        Ok(provider)
    }

    /// Re-obtain the accessor of a registered component by full name.
    pub fn provider<T: Send + Sync + 'static>(&self, full_name: &str) -> Result<Provider<T>, RegistryError> {
        let slot = self
            .slots
            .get(full_name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RegistryError::Unknown {
                name: full_name.to_string(),
            })?;

        slot.downcast::<Slot<T>>()
            .map(Provider::new)
            .map_err(|_| RegistryError::TypeMismatch {
                name: full_name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Full names of every registered component, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }
}
