//! Unified error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::provider::ProviderError;
use crate::registry::RegistryError;

/// The error type returned by frogsystem's fallible operations.
///
/// Request-path failures are expressed as [`Failure`](crate::Failure) values
/// rendered by the application boundary, never as `Error`s. This type covers
/// what happens outside a request: startup (configuration loading, provider
/// registration) and serving (binding a port, accepting connections).
/// Startup errors abort the process before the first request is accepted.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("provider `{provider}` failed to register: {source}")]
    Provider {
        provider: &'static str,
        #[source]
        source: ProviderError,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
