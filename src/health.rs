//! Built-in health-check handlers.
//!
//! The orchestrator (or a plain load-balancer) asks two questions:
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve traffic? Failure → pulled from rotation. |
//!
//! The core mounts no routes of its own, so register these on the router you
//! hand to the application:
//!
//! ```rust,no_run
//! use frogsystem::{Router, health};
//!
//! let router = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```
//!
//! Override `readiness` with a custom handler if you need to gate on
//! dependency availability (database connections, downstream services).

use crate::{Request, Response};

/// Liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive; this handler intentionally has no dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace this with your own handler
/// if the application needs a warm-up period or must verify dependency
/// health before accepting traffic.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
