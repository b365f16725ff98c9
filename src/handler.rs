//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`. Rust collections can only hold one concrete type,
//! so we use trait objects (`dyn ErasedHandler`) to hide the concrete
//! handler type behind a common interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_outcome() })  ← BoxFuture
//! ```
//!
//! The only runtime cost per request is one Arc clone (atomic inc) plus one
//! virtual call, negligible compared to network I/O.
//!
//! Handlers are fallible: whatever they return is converted through
//! [`IntoOutcome`], so an `Err(Failure)` flows up the middleware chain to
//! the application's error boundary like any other stage failure.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::StatusCode;

use crate::failure::{Failure, Outcome};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future.
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place; it cannot move it in memory after the first poll.
/// `Send + 'static` let tokio move the future across threads safely.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
/// External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<Outcome>;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `#[doc(hidden)] pub` for the same reason as `ErasedHandler`.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoOutcome
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. This prevents accidental misuse and
/// keeps the API surface stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

/// Implement `Handler` for any function with the right signature.
///
/// `Fn(Request) -> Fut` covers named `async fn` items, async closures, and
/// any struct that implements `Fn`.
impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Outcome> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// Conversion into an [`Outcome`].
///
/// Infallible handler returns (a [`Response`], a string, a status) become
/// `Ok`; a `Result<_, Failure>` passes its error through, to be rendered by
/// the application's failure boundary.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Response {
    fn into_outcome(self) -> Outcome {
        Ok(self)
    }
}

impl IntoOutcome for &'static str {
    fn into_outcome(self) -> Outcome {
        Ok(self.into_response())
    }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> Outcome {
        Ok(self.into_response())
    }
}

impl IntoOutcome for StatusCode {
    fn into_outcome(self) -> Outcome {
        Ok(self.into_response())
    }
}

impl<T: IntoResponse> IntoOutcome for Result<T, Failure> {
    fn into_outcome(self) -> Outcome {
        self.map(IntoResponse::into_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn request() -> Request {
        Request::new(Method::GET, "/".parse().unwrap())
    }

    #[tokio::test]
    async fn infallible_handlers_produce_ok() {
        async fn hello(_req: Request) -> &'static str {
            "hi"
        }

        let handler = hello.into_boxed_handler();
        let outcome = handler.call(request()).await;

        assert_eq!(outcome.unwrap().body(), b"hi");
    }

    #[tokio::test]
    async fn fallible_handlers_pass_failures_through() {
        async fn broken(_req: Request) -> Result<Response, Failure> {
            Err(Failure::with_trace("boom", ""))
        }

        let handler = broken.into_boxed_handler();
        let outcome = handler.call(request()).await;

        assert_eq!(outcome.unwrap_err().message(), "boom");
    }
}
