//! Middleware layer.
//!
//! Two single-method capabilities make up the whole contract:
//!
//! - [`RequestHandler`] turns a request into a response.
//! - [`Middleware`] receives a request plus the *next* handler and decides
//!   whether to delegate (`next.handle(req)`) or answer on its own.
//!
//! Both are generic over the request and response types. The dispatchers in
//! this module never look inside either; they only thread values through.
//!
//! ```text
//! MiddlewareCollection ──► MiddlewareQueue     (destructive, single pass)
//!                     └──► MiddlewarePipeline  (immutable, reusable)
//!
//! handle(req)
//!   └─ mw[0].process(req, next)
//!        └─ next.handle(req)
//!             └─ mw[1].process(req, next)
//!                  └─ …  └─ fallback.handle(req)
//! ```
//!
//! Failures are not a concept at this layer. Pick `Res = Result<T, E>` and
//! whatever a middleware or the fallback returns reaches the caller as is.

use std::sync::Arc;

mod collection;
mod pipeline;
mod queue;

pub use collection::{Iter, Key, MiddlewareCollection};
pub use pipeline::{MiddlewarePipeline, Next};
pub use queue::MiddlewareQueue;

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Produces a response for a request.
///
/// Implemented by fallback handlers, by the [`Router`](crate::Router), and by
/// the dispatchers themselves, which is what lets a middleware call back into
/// the chain.
pub trait RequestHandler<Req, Res> {
    fn handle(&self, request: Req) -> Res;
}

/// A link in the chain of responsibility.
///
/// `next` continues the chain from the following middleware. Not calling it
/// short-circuits: no later middleware and no fallback will run.
pub trait Middleware<Req, Res> {
    fn process(&self, request: Req, next: &dyn RequestHandler<Req, Res>) -> Res;

    /// Label used in trace output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A shared, type-erased middleware as stored in a [`MiddlewareCollection`].
///
/// `Arc` so that [`MiddlewareCollection::all`] snapshots and pipelines can
/// share units without copying them.
pub type BoxedMiddleware<Req, Res> = Arc<dyn Middleware<Req, Res> + Send + Sync>;

impl<Req, Res, H> RequestHandler<Req, Res> for &H
where
    H: RequestHandler<Req, Res> + ?Sized,
{
    fn handle(&self, request: Req) -> Res {
        (**self).handle(request)
    }
}

impl<Req, Res, H> RequestHandler<Req, Res> for Box<H>
where
    H: RequestHandler<Req, Res> + ?Sized,
{
    fn handle(&self, request: Req) -> Res {
        (**self).handle(request)
    }
}

impl<Req, Res, H> RequestHandler<Req, Res> for Arc<H>
where
    H: RequestHandler<Req, Res> + ?Sized,
{
    fn handle(&self, request: Req) -> Res {
        (**self).handle(request)
    }
}

// ── Closure adapters ──────────────────────────────────────────────────────────

/// Wraps a closure `Fn(Req) -> Res` as a [`RequestHandler`].
///
/// ```rust
/// use mwqueue::{RequestHandler, handler_fn};
///
/// let echo = handler_fn(|req: String| req);
/// assert_eq!(echo.handle("hi".to_owned()), "hi");
/// ```
pub fn handler_fn<Req, Res, F>(f: F) -> FnHandler<F>
where
    F: Fn(Req) -> Res,
{
    FnHandler(f)
}

/// Wraps a closure `Fn(Req, &dyn RequestHandler) -> Res` as a [`Middleware`].
///
/// ```rust
/// use mwqueue::{MiddlewareCollection, middleware_fn};
///
/// let mut chain = MiddlewareCollection::<String, String>::new();
/// chain.push(middleware_fn(|req: String, next: &dyn mwqueue::RequestHandler<String, String>| {
///     next.handle(req.to_uppercase())
/// }));
/// ```
pub fn middleware_fn<Req, Res, F>(f: F) -> FnMiddleware<F>
where
    F: Fn(Req, &dyn RequestHandler<Req, Res>) -> Res,
{
    FnMiddleware(f)
}

/// See [`handler_fn`].
#[derive(Clone, Copy)]
pub struct FnHandler<F>(F);

impl<Req, Res, F> RequestHandler<Req, Res> for FnHandler<F>
where
    F: Fn(Req) -> Res,
{
    fn handle(&self, request: Req) -> Res {
        (self.0)(request)
    }
}

/// See [`middleware_fn`].
#[derive(Clone, Copy)]
pub struct FnMiddleware<F>(F);

impl<Req, Res, F> Middleware<Req, Res> for FnMiddleware<F>
where
    F: Fn(Req, &dyn RequestHandler<Req, Res>) -> Res,
{
    fn process(&self, request: Req, next: &dyn RequestHandler<Req, Res>) -> Res {
        (self.0)(request, next)
    }

    fn name(&self) -> &str {
        "middleware_fn"
    }
}
