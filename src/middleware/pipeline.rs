//! Reusable, non-destructive dispatcher.
//!
//! A [`MiddlewarePipeline`] freezes the positional order of a collection into
//! an immutable slice. Each request walks that slice with a [`Next`] cursor:
//! the cursor at position `i` runs middleware `i` and hands it the cursor at
//! `i + 1`. Nothing is shared mutably, so one pipeline can serve any number
//! of requests, including concurrently.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::{BoxedMiddleware, MiddlewareCollection, RequestHandler};

/// The fallback as owned by a pipeline.
type BoxedFallback<Req, Res> = Arc<dyn RequestHandler<Req, Res> + Send + Sync>;

/// An immutable middleware chain plus the fallback it ends in.
///
/// Cloning is cheap: both halves sit behind `Arc`.
///
/// ```rust
/// use mwqueue::{MiddlewareCollection, MiddlewarePipeline, RequestHandler, handler_fn, middleware_fn};
///
/// type Next<'a> = &'a dyn RequestHandler<u32, u32>;
///
/// let mut chain = MiddlewareCollection::new();
/// chain.push(middleware_fn(|n: u32, next: Next<'_>| next.handle(n + 1)));
///
/// let pipeline = MiddlewarePipeline::new(chain, handler_fn(|n: u32| n * 10));
///
/// assert_eq!(pipeline.handle(1), 20);
/// assert_eq!(pipeline.handle(2), 30);
/// assert_eq!(pipeline.len(), 1);
/// ```
pub struct MiddlewarePipeline<Req, Res> {
    middlewares: Arc<[BoxedMiddleware<Req, Res>]>,
    fallback: BoxedFallback<Req, Res>,
}

impl<Req, Res> MiddlewarePipeline<Req, Res> {
    /// Takes the middlewares of `collection` in positional order.
    pub fn new<F>(collection: MiddlewareCollection<Req, Res>, fallback: F) -> Self
    where
        F: RequestHandler<Req, Res> + Send + Sync + 'static,
    {
        Self {
            middlewares: collection.into_iter().collect(),
            fallback: Arc::new(fallback),
        }
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Cursor at the front of the chain.
    pub fn start(&self) -> Next<'_, Req, Res> {
        Next { middlewares: &self.middlewares, fallback: &*self.fallback, position: 0 }
    }
}

impl<Req, Res> RequestHandler<Req, Res> for MiddlewarePipeline<Req, Res> {
    fn handle(&self, request: Req) -> Res {
        self.start().handle(request)
    }
}

impl<Req, Res> Clone for MiddlewarePipeline<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            middlewares: Arc::clone(&self.middlewares),
            fallback: Arc::clone(&self.fallback),
        }
    }
}

impl<Req, Res> fmt::Debug for MiddlewarePipeline<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("middlewares", &self.middlewares.iter().map(|m| m.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of a pipeline, from `position` onwards.
///
/// This is the handler a middleware receives as `next` when it runs inside a
/// [`MiddlewarePipeline`].
pub struct Next<'a, Req, Res> {
    middlewares: &'a [BoxedMiddleware<Req, Res>],
    fallback: &'a (dyn RequestHandler<Req, Res> + Send + Sync),
    position: usize,
}

impl<Req, Res> Next<'_, Req, Res> {
    /// Index of the middleware this cursor runs next.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Middlewares left before the fallback.
    pub fn remaining(&self) -> usize {
        self.middlewares.len().saturating_sub(self.position)
    }
}

impl<Req, Res> RequestHandler<Req, Res> for Next<'_, Req, Res> {
    fn handle(&self, request: Req) -> Res {
        match self.middlewares.get(self.position) {
            Some(middleware) => {
                trace!(middleware = middleware.name(), position = self.position, "processing middleware");
                let next = Next { position: self.position + 1, ..*self };
                middleware.process(request, &next)
            }
            None => {
                trace!(position = self.position, "end of pipeline, delegating to fallback");
                self.fallback.handle(request)
            }
        }
    }
}

impl<Req, Res> Clone for Next<'_, Req, Res> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Req, Res> Copy for Next<'_, Req, Res> {}

impl<Req, Res> fmt::Debug for Next<'_, Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("position", &self.position)
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::thread;

    use super::*;
    use crate::middleware::{Middleware, handler_fn, middleware_fn};

    type Trace = Arc<Mutex<Vec<String>>>;

    struct Recording {
        name: &'static str,
        trace: Trace,
    }

    impl Middleware<String, String> for Recording {
        fn process(&self, request: String, next: &dyn RequestHandler<String, String>) -> String {
            self.trace.lock().unwrap().push(self.name.to_owned());
            next.handle(format!("{request}>{}", self.name))
        }
    }

    fn chain(names: &[&'static str], trace: &Trace) -> MiddlewareCollection<String, String> {
        let mut c = MiddlewareCollection::new();
        for &name in names {
            c.push(Recording { name, trace: Arc::clone(trace) });
        }
        c
    }

    fn echo() -> impl RequestHandler<String, String> + Send + Sync + 'static {
        handler_fn(|req: String| format!("echo({req})"))
    }

    #[test]
    fn runs_in_order_and_ends_in_fallback() {
        let trace = Trace::default();
        let pipeline = MiddlewarePipeline::new(chain(&["logging", "auth"], &trace), echo());

        assert_eq!(pipeline.handle("req".to_owned()), "echo(req>logging>auth)");
        assert_eq!(*trace.lock().unwrap(), ["logging", "auth"]);
    }

    #[test]
    fn empty_pipeline_is_the_fallback() {
        let pipeline = MiddlewarePipeline::new(MiddlewareCollection::new(), echo());
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.handle("req".to_owned()), "echo(req)");
    }

    #[test]
    fn pipeline_is_reusable() {
        let trace = Trace::default();
        let pipeline = MiddlewarePipeline::new(chain(&["a", "b"], &trace), echo());

        assert_eq!(pipeline.handle("1".to_owned()), "echo(1>a>b)");
        assert_eq!(pipeline.handle("2".to_owned()), "echo(2>a>b)");
        assert_eq!(pipeline.len(), 2);
        assert_eq!(*trace.lock().unwrap(), ["a", "b", "a", "b"]);
    }

    #[test]
    fn keyed_entries_keep_positional_order() {
        let trace = Trace::default();
        let mut c = chain(&["first"], &trace);
        c.set("auth", Recording { name: "auth", trace: Arc::clone(&trace) });
        c.unshift(Recording { name: "front", trace: Arc::clone(&trace) });

        let pipeline = MiddlewarePipeline::new(c, echo());
        assert_eq!(pipeline.handle("r".to_owned()), "echo(r>front>first>auth)");
    }

    #[test]
    fn short_circuit_stops_the_chain() {
        let trace = Trace::default();
        let mut c = chain(&["before"], &trace);
        c.push(middleware_fn(|_req: String, _next: &dyn RequestHandler<String, String>| {
            "403".to_owned()
        }));
        c.push(Recording { name: "after", trace: Arc::clone(&trace) });

        let pipeline = MiddlewarePipeline::new(c, echo());
        assert_eq!(pipeline.handle("r".to_owned()), "403");
        assert_eq!(*trace.lock().unwrap(), ["before"]);
    }

    #[test]
    fn middleware_can_wrap_the_response() {
        let mut c = MiddlewareCollection::new();
        c.push(middleware_fn(|req: String, next: &dyn RequestHandler<String, String>| {
            format!("[{}]", next.handle(req))
        }));
        c.push(middleware_fn(|req: String, next: &dyn RequestHandler<String, String>| {
            format!("<{}>", next.handle(req))
        }));

        let pipeline = MiddlewarePipeline::new(c, echo());
        assert_eq!(pipeline.handle("x".to_owned()), "[<echo(x)>]");
    }

    #[test]
    fn cursor_reports_position() {
        let pipeline = MiddlewarePipeline::new(chain(&["a", "b", "c"], &Trace::default()), echo());
        let start = pipeline.start();
        assert_eq!(start.position(), 0);
        assert_eq!(start.remaining(), 3);
    }

    #[test]
    fn shared_across_threads() {
        let trace = Trace::default();
        let pipeline = MiddlewarePipeline::new(chain(&["a", "b"], &trace), echo());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let pipeline = pipeline.clone();
                thread::spawn(move || pipeline.handle(i.to_string()))
            })
            .collect();

        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), format!("echo({i}>a>b)"));
        }
        assert_eq!(trace.lock().unwrap().len(), 8);
    }
}
