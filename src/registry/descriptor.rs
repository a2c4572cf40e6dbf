//! Component descriptors.

use std::fmt;
use std::sync::Arc;

use crate::config::Scanner;
use crate::lifecycle::Shutdown;
use crate::BoxError;

type CreateFn<T> = Arc<dyn Fn(&dyn Scanner) -> Result<T, BoxError> + Send + Sync>;
type CreatedFn<T> = Arc<dyn Fn(&CreatedContext, &Arc<T>) + Send + Sync>;
type DestroyFn<T> = Arc<dyn Fn(Arc<T>) -> Result<(), BoxError> + Send + Sync>;

/// What a component's `on_created` callback can see.
#[derive(Clone)]
pub struct CreatedContext {
    /// `"<Descriptor> (<name>)"`.
    pub full_name: String,
    /// For starting tickers or registering extra hooks.
    pub shutdown: Shutdown,
}

/// How to build, announce and tear down one kind of component.
///
/// `create` receives the component's config section. `on_created` runs once
/// right after a successful `create`; it must not access the component
/// through its own provider. `on_destroy` is registered as a shutdown hook.
pub struct Descriptor<T> {
    name: String,
    pub(crate) create: CreateFn<T>,
    pub(crate) on_created: Option<CreatedFn<T>>,
    pub(crate) on_destroy: Option<DestroyFn<T>>,
}

impl<T> Descriptor<T> {
    pub fn new<F>(name: impl Into<String>, create: F) -> Self
    where
        F: Fn(&dyn Scanner) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            create: Arc::new(create),
            on_created: None,
            on_destroy: None,
        }
    }

    pub fn on_created<F>(mut self, f: F) -> Self
    where
        F: Fn(&CreatedContext, &Arc<T>) + Send + Sync + 'static,
    {
        self.on_created = Some(Arc::new(f));
        self
    }

    pub fn on_destroy<F>(mut self, f: F) -> Self
    where
        F: Fn(Arc<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_destroy = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_name(&self, instance: &str) -> String {
        format!("{} ({})", self.name, instance)
    }
}

impl<T> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            create: Arc::clone(&self.create),
            on_created: self.on_created.clone(),
            on_destroy: self.on_destroy.clone(),
        }
    }
}

impl<T> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("on_created", &self.on_created.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}
