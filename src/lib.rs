//! # frogsystem
//!
//! Front controller and application bootstrap for the Frogsystem web
//! platform.
//!
//! This crate is a thin composition layer, not an engine. It owns four
//! things and nothing else:
//!
//! - a typed service [`Registry`] populated once at startup, optionally
//!   delegating to an embedding host's registry
//! - one-shot service [`Provider`]s (configuration is a baseline binding,
//!   the database provider registers the [`ConnectionManager`])
//! - a fixed two-stage middleware chain: routing resolution, then the
//!   legacy-compat shim serving the pre-framework public tree
//! - a single failure boundary that renders every uncaught request error as
//!   a fixed HTML page with status `501`
//!
//! Routing, the database engine, and the concurrency model are external
//! collaborators: the host registers routes on the [`Router`], the
//! [`ConnectionManager`] hands out lazily-connecting pools, and the
//! [`Server`] (or any embedding runtime) decides how requests are scheduled.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use frogsystem::{Application, Registry, Request, Response, Router, Server, health};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), frogsystem::Error> {
//!     let mut registry = Registry::new();
//!     registry.insert(Arc::new(
//!         Router::new()
//!             .get("/healthz", health::liveness)
//!             .get("/users/{id}", get_user),
//!     ));
//!
//!     let app = Application::with_delegate(".", Some(Arc::new(registry)))?;
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```
//!
//! Configuration lives in `<root>/config/main.toml` (override the path with
//! the `FS2CONFIG` environment variable). Startup fails fast: a malformed
//! config file or an unsatisfiable provider aborts the boot. Once serving,
//! no request error ever reaches the host; the failure boundary answers
//! with the error page instead.

mod app;
mod config;
mod database;
mod error;
mod failure;
mod fs;
mod handler;
mod logger;
mod provider;
mod registry;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use app::{Application, Continuation};
pub use config::{Config, ConfigError, Settings};
pub use database::{ConnectionManager, ConnectionSettings, DatabaseProvider};
pub use error::Error;
pub use failure::{Failure, Outcome};
pub use fs::Filesystem;
pub use handler::{BoxFuture, Handler, IntoOutcome};
pub use logger::{Logger, NullLogger, TracingLogger};
pub use provider::{Provider, ProviderError};
pub use registry::{Registry, RegistryError};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
