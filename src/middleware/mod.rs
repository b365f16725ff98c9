//! Middleware layer.
//!
//! Request handling is an ordered sequence of stages with
//! delegate-or-terminate semantics: each stage receives the request, the
//! in-flight response, and the rest of the chain as a [`Next`] value. It
//! either produces an [`Outcome`] itself or calls `next.run(…)` to hand the
//! pair to the following stage. No stage can be skipped or reordered at
//! runtime: the order is fixed when the [`Pipeline`] is built.
//!
//! Failures are values. A stage that cannot proceed returns `Err(Failure)`
//! and the error travels straight up through the pending `run` calls to the
//! application boundary; no stage after the failing one runs.
//!
//! The pipeline for this application is routing resolution
//! ([`RouterStage`]) followed by the legacy-compat shim ([`LegacyStage`]).

use std::sync::Arc;

use crate::failure::Outcome;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

pub mod legacy;
pub mod router;

pub use legacy::LegacyStage;
pub use router::RouterStage;

/// A request-processing stage.
///
/// Implementations clone whatever they need into the returned future; the
/// future must not borrow `self`, which is what lets stages be shared across
/// concurrent requests as plain `Arc`s.
pub trait Middleware: Send + Sync + 'static {
    /// Process the request, either terminating with an outcome or
    /// delegating via `next.run(request, response)`.
    fn handle(&self, request: Request, response: Response, next: Next) -> BoxFuture<Outcome>;

    /// Stage name, for diagnostics.
    fn name(&self) -> &'static str {
        "middleware"
    }
}

type ChainFn = Box<dyn FnOnce(Request, Response) -> BoxFuture<Outcome> + Send>;

/// The rest of the chain, handed to a stage as a consumable capability.
///
/// Calling [`run`](Next::run) advances to the next stage exactly once; a
/// stage that never calls it has terminated the chain.
pub struct Next {
    inner: ChainFn,
}

impl Next {
    fn new(inner: ChainFn) -> Self {
        Self { inner }
    }

    /// Runs the remainder of the chain with the given pair.
    pub async fn run(self, request: Request, response: Response) -> Outcome {
        (self.inner)(request, response).await
    }
}

/// An ordered middleware chain.
pub struct Pipeline {
    stages: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    /// Builds a pipeline. The stage order given here is final.
    pub fn new(stages: Vec<Arc<dyn Middleware>>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs the chain.
    ///
    /// `terminal` is the continuation that observes the pair when every
    /// stage has delegated; for the application it is the caller-supplied
    /// outer continuation. The chain is folded right-to-left so each stage
    /// sees exactly the stages after it as its `Next`.
    pub async fn run<T>(&self, request: Request, response: Response, terminal: T) -> Outcome
    where
        T: FnOnce(Request, Response) -> BoxFuture<Outcome> + Send + 'static,
    {
        let mut chain: ChainFn = Box::new(terminal);
        for stage in self.stages.iter().rev() {
            let stage = Arc::clone(stage);
            let tail = chain;
            chain = Box::new(move |request, response| stage.handle(request, response, Next::new(tail)));
        }
        chain(request, response).await
    }
}
