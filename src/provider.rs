//! Service providers.
//!
//! A provider is a startup-time unit that performs one registration side
//! effect against the registry. The application constructs each declared
//! provider with its dependencies resolved from the registry, then invokes
//! [`register`](Provider::register) exactly once per provider, in declared
//! order. The order is explicit and fixed: a provider may only depend on
//! bindings established before it (baseline bindings or earlier providers).
//!
//! Registration failures are fatal. They surface to the process host as
//! startup errors; the request boundary never sees them.

use thiserror::Error;

use crate::registry::{Registry, RegistryError};

/// Raised when a provider cannot complete its registration.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing configuration key `{0}`")]
    MissingKey(String),
    #[error("invalid configuration under `{key}`: {source}")]
    InvalidSettings {
        key: String,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A one-shot registration unit.
pub trait Provider: Send + Sync {
    /// Provider name, for diagnostics and error reporting.
    fn name(&self) -> &'static str;

    /// Registers this provider's bindings. Called exactly once, at startup.
    fn register(&self, registry: &mut Registry) -> Result<(), ProviderError>;
}
