//! Legacy-compatibility stage.
//!
//! The pre-framework application exposed its whole surface as files under
//! the public directory (content, media, styles, upload). This shim keeps
//! those URLs alive behind the router: whatever the router does not claim is
//! looked up on disk and served with an extension-derived content type.
//!
//! The stage is terminal. It answers everything, if only with a 404, so the
//! chain never runs past it.

use std::io;

use http::{Method, StatusCode};

use crate::failure::{Failure, Outcome};
use crate::fs::Filesystem;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Serves the legacy public tree.
pub struct LegacyStage {
    public: Filesystem,
}

impl LegacyStage {
    /// `public` must be rooted at the public asset directory.
    pub fn new(public: Filesystem) -> Self {
        Self { public }
    }
}

impl Middleware for LegacyStage {
    fn handle(&self, request: Request, _response: Response, _next: Next) -> BoxFuture<Outcome> {
        let public = self.public.clone();
        Box::pin(async move {
            if request.method() != Method::GET && request.method() != Method::HEAD {
                return Ok(Response::status(StatusCode::METHOD_NOT_ALLOWED));
            }

            let path = request.path().trim_start_matches('/');
            let path = if path.is_empty() { "index.html" } else { path };

            match public.read(path) {
                Ok(bytes) => Ok(Response::builder().body(mime_for(path), bytes)),
                Err(e) if is_miss(&e) => Ok(Response::status(StatusCode::NOT_FOUND)),
                Err(e) => Err(Failure::from(e)),
            }
        })
    }

    fn name(&self) -> &'static str {
        "legacy"
    }
}

/// Read failures that mean "no such asset" rather than "something broke".
/// Escaping paths are rejected as `InvalidInput` and answered like a miss.
fn is_miss(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput | io::ErrorKind::IsADirectory
    )
}

fn mime_for(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
