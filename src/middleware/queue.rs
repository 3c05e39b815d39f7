//! Destructive FIFO dispatcher.
//!
//! [`MiddlewareQueue`] consumes its collection as it runs. Every `handle`
//! call shifts the front middleware out for good, so one populated
//! collection backs exactly one pass through the chain. Once it is empty,
//! every further `handle` goes straight to the fallback.
//!
//! The queue borrows the collection mutably for as long as it lives, which
//! means nothing else can touch the collection mid-chain. Dropping the queue
//! hands the (drained) collection back to the caller. Clone the collection
//! first if it has to serve more than one request, or use
//! [`MiddlewarePipeline`](super::MiddlewarePipeline), which never mutates.

use std::cell::RefCell;
use std::fmt;

use tracing::trace;

use super::{MiddlewareCollection, RequestHandler};

/// A request handler that runs the middlewares of a collection in FIFO
/// order, then delegates to a fallback handler.
///
/// ```rust
/// use mwqueue::{MiddlewareCollection, MiddlewareQueue, RequestHandler, handler_fn, middleware_fn};
///
/// type Next<'a> = &'a dyn RequestHandler<String, String>;
///
/// let mut chain = MiddlewareCollection::new();
/// chain
///     .push(middleware_fn(|req: String, next: Next<'_>| next.handle(req + " a")))
///     .push(middleware_fn(|req: String, next: Next<'_>| next.handle(req + " b")));
///
/// let fallback = handler_fn(|req: String| req + " done");
/// let queue = MiddlewareQueue::new(&mut chain, &fallback);
///
/// assert_eq!(queue.handle("start".to_owned()), "start a b done");
/// assert_eq!(queue.remaining(), 0);
/// ```
pub struct MiddlewareQueue<'a, Req, Res> {
    middlewares: RefCell<&'a mut MiddlewareCollection<Req, Res>>,
    fallback: &'a dyn RequestHandler<Req, Res>,
}

impl<'a, Req, Res> MiddlewareQueue<'a, Req, Res> {
    pub fn new(
        middlewares: &'a mut MiddlewareCollection<Req, Res>,
        fallback: &'a dyn RequestHandler<Req, Res>,
    ) -> Self {
        Self { middlewares: RefCell::new(middlewares), fallback }
    }

    /// Number of middlewares not yet shifted out.
    pub fn remaining(&self) -> usize {
        self.middlewares.borrow().len()
    }
}

impl<Req, Res> RequestHandler<Req, Res> for MiddlewareQueue<'_, Req, Res> {
    fn handle(&self, request: Req) -> Res {
        // The borrow ends with this statement. The middleware re-enters
        // `handle` through `self`, so it must not be held across `process`.
        let middleware = self.middlewares.borrow_mut().shift();

        match middleware {
            Some(middleware) => {
                trace!(
                    middleware = middleware.name(),
                    remaining = self.remaining(),
                    "processing middleware"
                );
                middleware.process(request, self)
            }
            None => {
                trace!("middleware queue exhausted, delegating to fallback");
                self.fallback.handle(request)
            }
        }
    }
}

impl<Req, Res> fmt::Debug for MiddlewareQueue<'_, Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareQueue")
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}
