//! Routing resolution stage.

use std::sync::Arc;

use crate::failure::Outcome;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// First stage of the pipeline: resolves the request against the router.
///
/// On a match the handler's outcome terminates the chain. On a miss the
/// request is delegated untouched, so the legacy shim behind it gets a
/// chance at everything the router does not claim.
pub struct RouterStage {
    router: Arc<Router>,
}

impl RouterStage {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }
}

impl Middleware for RouterStage {
    fn handle(&self, request: Request, response: Response, next: Next) -> BoxFuture<Outcome> {
        let router = Arc::clone(&self.router);
        Box::pin(async move {
            match router.lookup(request.method(), request.path()) {
                Some((handler, params)) => {
                    let mut request = request;
                    request.set_params(params);
                    handler.call(request).await
                }
                None => next.run(request, response).await,
            }
        })
    }

    fn name(&self) -> &'static str {
        "router"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Pipeline;
    use http::{Method, StatusCode};

    #[tokio::test]
    async fn matched_routes_terminate_the_chain() {
        async fn show(req: Request) -> Response {
            Response::text(format!("user {}", req.param("id").unwrap_or("?")))
        }
        let router = Arc::new(Router::new().get("/users/{id}", show));
        let pipeline = Pipeline::new(vec![Arc::new(RouterStage::new(router))]);

        let response = pipeline
            .run(
                Request::new(Method::GET, "/users/42".parse().unwrap()),
                Response::status(StatusCode::NOT_FOUND),
                |_, _| Box::pin(async { panic!("terminal must not run") }),
            )
            .await
            .unwrap();

        assert_eq!(response.body(), b"user 42");
    }

    #[tokio::test]
    async fn unmatched_requests_delegate() {
        let router = Arc::new(Router::new());
        let pipeline = Pipeline::new(vec![Arc::new(RouterStage::new(router))]);

        let response = pipeline
            .run(
                Request::new(Method::GET, "/nowhere".parse().unwrap()),
                Response::status(StatusCode::NOT_FOUND),
                |_, response| Box::pin(async move { Ok(response) }),
            )
            .await
            .unwrap();

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
