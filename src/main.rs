//! Binary front controller.
//!
//! Boots the application from the current directory and serves it. The
//! health probes are the only routes mounted here; everything else falls
//! through to the legacy shim.

use std::sync::Arc;

use frogsystem::{Application, Registry, Router, Server, health};

#[tokio::main]
async fn main() -> Result<(), frogsystem::Error> {
    tracing_subscriber::fmt::init();

    let root = std::env::current_dir()?;

    let mut registry = Registry::new();
    registry.insert(Arc::new(
        Router::new()
            .get("/healthz", health::liveness)
            .get("/readyz", health::readiness),
    ));

    let app = Application::with_delegate(root, Some(Arc::new(registry)))?;
    let listen = app
        .config()
        .get_str("server.listen")
        .unwrap_or("0.0.0.0:3000")
        .to_owned();

    Server::bind(&listen).serve(app).await
}
