//! # mwqueue
//!
//! A FIFO middleware queue for HTTP request handling. An ordered, keyed
//! collection of middlewares sits in front of a fallback handler; each
//! middleware either answers the request itself or passes it on.
//!
//! ## The contract
//!
//! Two capabilities, one method each:
//!
//! - [`RequestHandler`]: `handle(request) -> response`
//! - [`Middleware`]: `process(request, next) -> response`
//!
//! Everything else is built out of those:
//!
//! - [`MiddlewareCollection`]: ordered container with keyed and positional
//!   access (`get`/`set`/`push`/`pop`/`shift`/`unshift`/…)
//! - [`MiddlewareQueue`]: dispatcher that *shifts* middlewares out of its
//!   collection as it runs. One populated collection, one pass.
//! - [`MiddlewarePipeline`]: dispatcher over a frozen copy of the
//!   collection. Reusable and safe to share between threads.
//!
//! Both dispatchers run middlewares in insertion order and end in the
//! fallback. Failures belong to the collaborators: make the response type a
//! `Result` and errors pass through untouched.
//!
//! On top of the core sit the HTTP pieces needed to serve a chain: a
//! [`Request`]/[`Response`] pair, a radix-tree [`Router`] (the usual
//! fallback), and a hyper-based [`Server`] with graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use mwqueue::{
//!     Method, MiddlewareCollection, MiddlewarePipeline, Request, RequestHandler,
//!     Response, Router, Server, StatusCode, middleware_fn,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .on(Method::GET, "/users/{id}", get_user);
//!
//!     let mut chain = MiddlewareCollection::new();
//!     chain.set("auth", middleware_fn(|req: Request, next: &dyn RequestHandler<Request, Response>| {
//!         if req.header("authorization").is_none() {
//!             return Response::status(StatusCode::UNAUTHORIZED);
//!         }
//!         next.handle(req)
//!     }));
//!
//!     let pipeline = MiddlewarePipeline::new(chain, app);
//!     Server::bind("0.0.0.0:3000").unwrap().serve(pipeline).await.unwrap();
//! }
//!
//! fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use error::Error;
pub use handler::Handler;
pub use middleware::{
    BoxedMiddleware, Key, Middleware, MiddlewareCollection, MiddlewarePipeline, MiddlewareQueue,
    Next, RequestHandler, handler_fn, middleware_fn,
};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

pub use http::{Method, StatusCode};
