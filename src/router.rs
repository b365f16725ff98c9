//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router is an
//! external collaborator of the request pipeline: the application mounts it
//! as the first middleware stage but registers no routes of its own. Routes
//! come from the embedding host, through the delegate registry.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// One radix tree per HTTP method. Build it once at startup; bind it as
/// `Arc<Router>` in the registry handed to the application. Each
/// registration call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register a handler for a method + path pair. Returns `self` for
    /// chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves
    /// them:
    ///
    /// ```rust,no_run
    /// # use frogsystem::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET, "/users/{id}", get_user)
    ///     .on(Method::POST, "/users", create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics on an invalid or conflicting route pattern.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// `GET` shorthand for [`on`](Router::on).
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    /// `POST` shorthand for [`on`](Router::on).
    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    /// `PUT` shorthand for [`on`](Router::on).
    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    /// `DELETE` shorthand for [`on`](Router::on).
    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;

    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    #[test]
    fn lookup_matches_method_and_path() {
        let router = Router::new().get("/users/{id}", ok);

        let (_, params) = router.lookup(&Method::GET, "/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        assert!(router.lookup(&Method::POST, "/users/42").is_none());
        assert!(router.lookup(&Method::GET, "/users").is_none());
    }

    #[tokio::test]
    async fn matched_handler_runs() {
        let router = Router::new().post("/users", ok);

        let (handler, _) = router.lookup(&Method::POST, "/users").unwrap();
        let outcome = handler
            .call(Request::new(Method::POST, "/users".parse().unwrap()))
            .await;

        assert_eq!(outcome.unwrap().body(), b"ok");
    }
}
