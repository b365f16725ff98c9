//! Typed service registry.
//!
//! The registry is the integration contract between the application, its
//! service providers, and an embedding host. Bindings are keyed by type
//! rather than by string: a consumer asks for `Arc<Config>` or
//! `Arc<dyn Logger>` and gets exactly that, checked at compile time.
//!
//! Lifecycle invariant: the registry is populated during startup (baseline
//! bindings, then provider registration) and treated as immutable for the
//! rest of the process lifetime. Nothing resolves from it per request.
//!
//! A registry may hold a delegate: an outer container supplied by the
//! embedding host. Lookups that miss locally fall through to the delegate;
//! local bindings shadow it.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

/// Raised by [`Registry::resolve`] when no binding exists for the requested
/// type, locally or in the delegate chain.
#[derive(Debug, Error)]
#[error("no binding registered for `{type_name}`")]
pub struct RegistryError {
    type_name: &'static str,
}

/// A type-keyed map of shared service bindings.
#[derive(Default)]
pub struct Registry {
    bindings: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    delegate: Option<Arc<Registry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that falls back to `delegate` on lookup misses.
    pub fn with_delegate(delegate: Arc<Registry>) -> Self {
        Self {
            bindings: HashMap::new(),
            delegate: Some(delegate),
        }
    }

    /// Binds `value` under its own type, returning the binding it displaced.
    ///
    /// Each type has exactly one effective binding: the last insert wins.
    /// Values are cheap to clone by construction (`Arc`-wrapped services).
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.bindings
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns a clone of the binding for `T`, consulting the delegate on a
    /// local miss.
    pub fn get<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        match self.bindings.get(&TypeId::of::<T>()) {
            Some(value) => value.downcast_ref::<T>().cloned(),
            None => self.delegate.as_ref().and_then(|d| d.get::<T>()),
        }
    }

    /// Like [`get`](Registry::get), but a miss is an error naming the type.
    pub fn resolve<T: Clone + Send + Sync + 'static>(&self) -> Result<T, RegistryError> {
        self.get::<T>().ok_or(RegistryError {
            type_name: type_name::<T>(),
        })
    }

    /// Whether a binding for `T` exists locally or in the delegate chain.
    pub fn contains<T: 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
            || self.delegate.as_ref().is_some_and(|d| d.contains::<T>())
    }
}
