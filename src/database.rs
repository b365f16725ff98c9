//! Database connection management.
//!
//! The engine itself is an external collaborator; this module only turns the
//! configured settings block into a named, lazily-connecting pool and makes
//! it resolvable through the registry. No connection is opened at startup:
//! the first query pays for it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::Config;
use crate::provider::{Provider, ProviderError};
use crate::registry::Registry;

// ── Settings ──────────────────────────────────────────────────────────────────

/// One connection's settings block, as configured under `database.<name>`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    5
}

impl ConnectionSettings {
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

// ── ConnectionManager ─────────────────────────────────────────────────────────

/// Named connection pools plus the configured default.
///
/// Bound into the registry by the [`DatabaseProvider`]; anything that talks
/// to the database resolves this and asks for a connection by name, or for
/// the default.
pub struct ConnectionManager {
    default: String,
    pools: HashMap<String, PgPool>,
    settings: HashMap<String, ConnectionSettings>,
}

impl ConnectionManager {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            pools: HashMap::new(),
            settings: HashMap::new(),
        }
    }

    /// Registers a connection under `name`. The pool connects lazily.
    pub fn add_connection(&mut self, name: impl Into<String>, settings: ConnectionSettings) {
        let name = name.into();
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_lazy_with(settings.connect_options());
        self.pools.insert(name.clone(), pool);
        self.settings.insert(name, settings);
    }

    /// The name of the configured default connection.
    pub fn default_connection(&self) -> &str {
        &self.default
    }

    /// The pool registered under `name`, or the default when `None`.
    pub fn connection(&self, name: Option<&str>) -> Option<&PgPool> {
        self.pools.get(name.unwrap_or(&self.default))
    }

    /// The settings a connection was registered with.
    pub fn settings(&self, name: Option<&str>) -> Option<&ConnectionSettings> {
        self.settings.get(name.unwrap_or(&self.default))
    }
}

// ── DatabaseProvider ──────────────────────────────────────────────────────────

/// Registers the [`ConnectionManager`] from configuration.
///
/// Reads `database.connection` to learn the active connection's name,
/// deserializes the matching `database.<name>` block, and binds a manager
/// holding that single named pool. A missing key or malformed block aborts
/// startup; there is no silent fallback.
#[derive(Debug)]
pub struct DatabaseProvider {
    config: Arc<Config>,
}

impl DatabaseProvider {
    /// Dependencies are resolved from the registry once, at construction.
    pub fn from_registry(registry: &Registry) -> Result<Self, ProviderError> {
        Ok(Self {
            config: registry.resolve::<Arc<Config>>()?,
        })
    }
}

impl Provider for DatabaseProvider {
    fn name(&self) -> &'static str {
        "database"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), ProviderError> {
        let name = self
            .config
            .get_str("database.connection")
            .ok_or_else(|| ProviderError::MissingKey("database.connection".to_owned()))?;
        let key = format!("database.{name}");
        let block = self
            .config
            .get(&key)
            .ok_or_else(|| ProviderError::MissingKey(key.clone()))?;
        let settings: ConnectionSettings = block
            .clone()
            .try_into()
            .map_err(|source| ProviderError::InvalidSettings { key, source })?;

        let mut manager = ConnectionManager::new(name);
        manager.add_connection(name, settings);
        registry.insert(Arc::new(manager));
        Ok(())
    }
}
