//! Route handler trait and type erasure.
//!
//! # How route handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`. Rust collections can only hold one concrete type,
//! so every handler is wrapped and stored as a [`RequestHandler`] trait
//! object.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! hello.into_boxed_handler()                 ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                 ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn RequestHandler<Request, Response>>
//! handler.handle(req)  at request time       ← one vtable dispatch
//! ```

use std::sync::Arc;

use crate::middleware::RequestHandler;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased route handler.
///
/// `#[doc(hidden)] pub` because it appears in the return type of the public
/// `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn RequestHandler<Request, Response> + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// function or closure with the signature:
///
/// ```text
/// fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, R> private::Sealed for F
where
    F: Fn(Request) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
}

impl<F, R> Handler for F
where
    F: Fn(Request) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`RequestHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, R> RequestHandler<Request, Response> for FnHandler<F>
where
    F: Fn(Request) -> R,
    R: IntoResponse,
{
    fn handle(&self, req: Request) -> Response {
        (self.0)(req).into_response()
    }
}
