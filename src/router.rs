//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler. A router is a [`RequestHandler`], which makes it the usual
//! fallback at the end of a middleware chain.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::RequestHandler;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup, then pass it to [`Server::serve`](crate::Server)
/// directly or as the fallback of a middleware chain. Each [`Router::on`] call
/// returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use mwqueue::{Method, Request, Response, Router};
    /// # fn get_user(_: Request) -> Response { Response::text("") }
    /// # fn create_user(_: Request) -> Response { Response::text("") }
    /// # fn delete_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::DELETE, "/users/{id}", delete_user)
    ///     .on(Method::GET,    "/users/{id}", get_user)
    ///     .on(Method::POST,   "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup, so this surfaces
    /// before the first request.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn allows_other_method(&self, method: &Method, path: &str) -> bool {
        self.routes.iter()
            .any(|(m, tree)| m != method && tree.at(path).is_ok())
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl RequestHandler<Request, Response> for Router {
    fn handle(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler.handle(req)
            }
            None if self.allows_other_method(req.method(), req.path()) => {
                debug!(method = %req.method(), path = req.path(), "method not allowed");
                Response::status(StatusCode::METHOD_NOT_ALLOWED)
            }
            None => {
                debug!(method = %req.method(), path = req.path(), "no route");
                Response::status(StatusCode::NOT_FOUND)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn request(method: Method, path: &str) -> Request {
        Request::from(
            http::Request::builder()
                .method(method)
                .uri(path)
                .body(Bytes::new())
                .unwrap(),
        )
    }

    fn get_user(req: Request) -> Response {
        Response::text(format!("user {}", req.param("id").unwrap_or("?")))
    }

    fn app() -> Router {
        Router::new()
            .on(Method::GET, "/users/{id}", get_user)
            .on(Method::POST, "/users", |_req: Request| StatusCode::CREATED)
            .on(Method::GET, "/hello", |_req: Request| "hello")
    }

    #[test]
    fn routes_by_method_and_path() {
        let app = app();
        assert_eq!(app.handle(request(Method::GET, "/hello")).body(), b"hello");
        assert_eq!(
            app.handle(request(Method::POST, "/users")).status_code(),
            StatusCode::CREATED,
        );
    }

    #[test]
    fn fills_path_params() {
        let res = app().handle(request(Method::GET, "/users/42"));
        assert_eq!(res.body(), b"user 42");
    }

    #[test]
    fn unknown_path_is_404() {
        let res = app().handle(request(Method::GET, "/nope"));
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn known_path_with_wrong_method_is_405() {
        let res = app().handle(request(Method::DELETE, "/users/42"));
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new()
            .on(Method::GET, "/a", |_req: Request| "one")
            .on(Method::GET, "/a", |_req: Request| "two");
    }
}
