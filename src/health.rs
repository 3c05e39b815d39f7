//! Built-in Kubernetes health-check handlers.
//!
//! | Check | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them on the router that ends your middleware chain:
//!
//! ```rust
//! use mwqueue::{Method, Router, health};
//!
//! let app = Router::new()
//!     .on(Method::GET, "/healthz", health::liveness)
//!     .on(Method::GET, "/readyz", health::readiness);
//! ```
//!
//! Health checks travel through the same middlewares as every other request. Put an
//! auth middleware behind a path check if the kubelet must not need a token.

use crate::{Request, Response};

/// Kubernetes liveness check handler.
///
/// Always returns `200 OK` with body `"ok"`.
pub fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Kubernetes readiness check handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace it with your own handler if
/// readiness depends on downstream services.
pub fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
