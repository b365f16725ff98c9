//! HTTP server and graceful shutdown.
//!
//! The server is the hosting runtime the application core assumes: it owns
//! the listener, the connection tasks, and the shutdown sequence, and it
//! drives [`Application::handle`] once per request with a pass-through
//! continuation and a `404` seed response.
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`; no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], letting `main` exit cleanly.
//!
//! Give the process supervisor a termination grace period longer than your
//! slowest request.

use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use http_body_util::BodyExt;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::app::Application;
use crate::error::Error;
use crate::failure::Failure;
use crate::request::Request;
use crate::response::Response;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `app`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, app: Application) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Shared across connection tasks; the registry inside is read-only
        // by now.
        let app = Arc::new(app);

        info!(addr = %self.addr, "frogsystem listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        // The shutdown future is polled in a loop, so it must be pinned on
        // the stack.
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` checks arms top-to-bottom: a shutdown signal must
                // win over queued connections.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    // TokioIo adapts tokio's AsyncRead/AsyncWrite to the
                    // hyper IO traits.
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // The closure runs once per request on the
                        // connection, not once per connection.
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { dispatch(app, req).await }
                        });

                        // `auto::Builder` handles both HTTP/1.1 and HTTP/2,
                        // whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not
                // grow without bound.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection before returning.
        while tasks.join_next().await.is_some() {}

        info!("frogsystem stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Hot path: feeds one hyper request through the application.
///
/// The error type is [`Infallible`](std::convert::Infallible): the
/// application boundary converts every failure into a response, so hyper
/// never sees an error from us.
async fn dispatch(
    app: Arc<Application>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<http_body_util::Full<bytes::Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();
    let request = match body.collect().await {
        Ok(collected) => Request::from_parts(parts, collected.to_bytes()),
        Err(e) => {
            // The request never became well-formed; all we can do is render
            // the failure page directly.
            let failure = Failure::new(format!("failed to read request body: {e}"));
            return Ok(Application::terminate(&failure).into_http());
        }
    };

    let seed = Response::status(StatusCode::NOT_FOUND);
    let response = app
        .handle(request, seed, |_req: Request, res: Response| async move { res })
        .await;

    Ok(response.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both SIGTERM (sent by process supervisors) and
/// SIGINT (Ctrl-C, for local development). On Windows only Ctrl-C is
/// available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves; on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
