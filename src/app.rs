//! The application: startup sequencing and the request entry point.
//!
//! # Startup
//!
//! Construction runs the whole bootstrap, in order: load configuration and
//! resolve the settings surface, establish the baseline bindings (logger,
//! filesystem, config, settings, router), construct the declared service
//! providers with their dependencies resolved from the registry, and run
//! each provider's registration exactly once. Anything that goes wrong here
//! is a fatal [`Error`] returned to the host; no request is ever served by a
//! partially started application. After construction the registry is
//! treated as immutable.
//!
//! # The failure boundary
//!
//! [`handle`](Application::handle) is the only error boundary on the request
//! path. Every `Err(Failure)` that escapes the middleware chain is rendered
//! by [`terminate`](Application::terminate) as a fixed HTML page with status
//! `501 Not Implemented` (a deliberate, long-standing contract signalling
//! "application-level failure" rather than a transport problem), and the
//! substitute page is routed through the caller's continuation, so an outer
//! chain still observes a terminating call instead of a crash. Nothing is
//! retried, and nothing is logged unless the host binds a real [`Logger`].

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use http::StatusCode;

use crate::config::{Config, Settings};
use crate::database::DatabaseProvider;
use crate::error::Error;
use crate::failure::{Failure, Outcome};
use crate::fs::Filesystem;
use crate::handler::BoxFuture;
use crate::logger::{Logger, NullLogger};
use crate::middleware::{LegacyStage, Pipeline, RouterStage};
use crate::provider::Provider;
use crate::registry::Registry;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

// ── Continuation ──────────────────────────────────────────────────────────────

/// The caller-supplied continuation handed to [`Application::handle`].
///
/// The hosting runtime's own tail of the chain: it observes the pair when
/// the application's stages have all delegated, and it carries the
/// substitute error page when request handling fails. Any
/// `Fn(Request, Response) -> impl Future<Output = Response>` qualifies.
pub trait Continuation: Send + Sync + 'static {
    fn call(&self, request: Request, response: Response) -> BoxFuture<Response>;
}

impl<F, Fut> Continuation for F
where
    F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request, response: Response) -> BoxFuture<Response> {
        Box::pin(self(request, response))
    }
}

// ── Application ───────────────────────────────────────────────────────────────

/// The assembled application.
pub struct Application {
    registry: Registry,
    config: Arc<Config>,
    settings: Arc<Settings>,
    logger: Arc<dyn Logger>,
    pipeline: Pipeline,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Boots an application rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        Self::with_delegate(root, None)
    }

    /// Boots an application whose registry falls back to `delegate`.
    ///
    /// The delegate is how an embedding host contributes bindings: a
    /// [`Router`] with the host's routes, or a [`Logger`] replacing the
    /// default no-op one.
    pub fn with_delegate(
        root: impl Into<PathBuf>,
        delegate: Option<Arc<Registry>>,
    ) -> Result<Self, Error> {
        let root = root.into();

        // Configuration first: the settings surface seeds its defaults into
        // the document, so every later consumer sees the merged view.
        let mut config = Config::load(&root)?;
        let settings = Arc::new(Settings::resolve(&root, &mut config));
        let config = Arc::new(config);

        // Baseline bindings. The logger defaults to a no-op implementation
        // but yields to one bound in the delegate.
        let mut registry = match delegate {
            Some(delegate) => Registry::with_delegate(delegate),
            None => Registry::new(),
        };
        if !registry.contains::<Arc<dyn Logger>>() {
            registry.insert::<Arc<dyn Logger>>(Arc::new(NullLogger));
        }
        registry.insert(Arc::new(Filesystem::new(&root)));
        registry.insert(Arc::clone(&config));
        registry.insert(Arc::clone(&settings));

        let router = registry
            .get::<Arc<Router>>()
            .unwrap_or_else(|| Arc::new(Router::new()));
        registry.insert(Arc::clone(&router));

        // Declared providers, dependencies resolved from the registry.
        let providers: Vec<Box<dyn Provider>> = vec![Box::new(
            DatabaseProvider::from_registry(&registry).map_err(|source| Error::Provider {
                provider: "database",
                source,
            })?,
        )];

        // One-time registration, in declared order.
        for provider in &providers {
            tracing::debug!(provider = provider.name(), "registering provider");
            provider
                .register(&mut registry)
                .map_err(|source| Error::Provider {
                    provider: provider.name(),
                    source,
                })?;
        }

        // The chain: routing resolution first, then the legacy shim.
        let pipeline = Pipeline::new(vec![
            Arc::new(RouterStage::new(router)),
            Arc::new(LegacyStage::new(Filesystem::new(settings.public_dir.clone()))),
        ]);
        let logger = registry.resolve::<Arc<dyn Logger>>()?;

        tracing::info!(
            root = %settings.root.display(),
            env = %settings.environment,
            "application ready"
        );

        Ok(Self {
            registry,
            config,
            settings,
            logger,
            pipeline,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handles one request.
    ///
    /// Runs the middleware chain over the pair. A stage that terminates
    /// produces the returned response directly; when every stage delegates,
    /// `next` observes the in-flight pair. If the chain fails, the failure
    /// is reported to the bound logger and `next` is called with the page
    /// from [`terminate`](Application::terminate) instead.
    pub async fn handle<N: Continuation>(
        &self,
        request: Request,
        response: Response,
        next: N,
    ) -> Response {
        let next: Arc<dyn Continuation> = Arc::new(next);
        let fallback = request.clone();

        let terminal = {
            let next = Arc::clone(&next);
            move |request: Request, response: Response| -> BoxFuture<Outcome> {
                Box::pin(async move { Ok(next.call(request, response).await) })
            }
        };

        match self.pipeline.run(request, response, terminal).await {
            Ok(response) => response,
            Err(failure) => {
                self.logger.error(&format!("request failed: {failure}"));
                next.call(fallback, Self::terminate(&failure)).await
            }
        }
    }

    /// Renders the failure page.
    ///
    /// Pure: the output depends only on the failure's message and trace, so
    /// identical failures produce byte-identical documents. Status is
    /// always `501`, content type `text/html`.
    pub fn terminate(error: &Failure) -> Response {
        let body = format!(
            r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">
<html>
    <head>
        <title>There was an error with your application</title>
    </head>
    <body>
        <h1>Quak! Something went wrong...</h1>
        <p>
            <b>{message}</b>
        </p>
        <pre>{trace}</pre>
    </body>
</html>"#,
            message = error.message(),
            trace = error.trace(),
        );
        Response::builder()
            .status(StatusCode::NOT_IMPLEMENTED)
            .html(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminate_renders_the_fixed_page() {
        let failure = Failure::with_trace("boom", "#0 stage\n#1 chain");
        let response = Application::terminate(&failure);

        assert_eq!(response.status_code(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(
            response.header("content-type"),
            Some("text/html; charset=utf-8")
        );
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("Quak! Something went wrong..."));
        assert!(body.contains("<b>boom</b>"));
        assert!(body.contains("<pre>#0 stage\n#1 chain</pre>"));
    }

    #[test]
    fn terminate_is_deterministic() {
        let failure = Failure::with_trace("boom", "#0 here");
        let first = Application::terminate(&failure);
        let second = Application::terminate(&failure);

        assert_eq!(first.body(), second.body());
        assert_eq!(first.status_code(), second.status_code());
    }

    #[test]
    fn the_message_appears_verbatim() {
        let failure = Failure::with_trace("café & <tags> intact", "");
        let response = Application::terminate(&failure);
        let body = String::from_utf8(response.body().to_vec()).unwrap();

        assert!(body.contains("café & <tags> intact"));
    }
}
