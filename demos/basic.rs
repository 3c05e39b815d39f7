//! Minimal mwqueue example: a router behind request-id, logging and auth
//! middlewares.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/healthz
//!   curl -i http://localhost:3000/users/42
//!   curl -i -H 'authorization: Bearer secret' http://localhost:3000/users/42
//!   curl -i -X POST -H 'authorization: Bearer secret' \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}' http://localhost:3000/users

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use mwqueue::{
    Method, Middleware, MiddlewareCollection, MiddlewarePipeline, Request, RequestHandler,
    Response, Router, Server, StatusCode, health,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

type Next<'a> = &'a dyn RequestHandler<Request, Response>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = Router::new()
        .on(Method::GET,    "/users/{id}", get_user)
        .on(Method::POST,   "/users",      create_user)
        .on(Method::DELETE, "/users/{id}", delete_user)
        .on(Method::GET,    "/healthz",    health::liveness)
        .on(Method::GET,    "/readyz",     health::readiness);

    let mut chain = MiddlewareCollection::new();
    chain
        .push(RequestId::default())
        .push(AccessLog)
        .set("auth", BearerAuth { token: "secret".to_owned() });

    let server = Server::bind("0.0.0.0:3000").expect("invalid listen address");
    server
        .serve(MiddlewarePipeline::new(chain, app))
        .await
        .expect("server error");
}

// ── Middlewares ───────────────────────────────────────────────────────────────

/// Tags every request and response with a sequential `x-request-id`.
#[derive(Default)]
struct RequestId {
    next_id: AtomicU64,
}

impl Middleware<Request, Response> for RequestId {
    fn process(&self, mut req: Request, next: Next<'_>) -> Response {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        if let Ok(value) = id.parse() {
            req.headers_mut().insert("x-request-id", value);
        }

        let mut res = next.handle(req);
        if let Ok(value) = id.parse() {
            res.headers_mut().insert("x-request-id", value);
        }
        res
    }
}

/// One log line per request, written after the rest of the chain answered.
struct AccessLog;

impl Middleware<Request, Response> for AccessLog {
    fn process(&self, req: Request, next: Next<'_>) -> Response {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_owned();
        let request_id = req.header("x-request-id").unwrap_or("-").to_owned();

        let res = next.handle(req);

        info!(
            %method,
            path,
            request_id,
            status = res.status_code().as_u16(),
            latency_us = start.elapsed().as_micros() as u64,
            "request"
        );
        res
    }
}

/// Rejects requests without the expected bearer token. Health checks pass.
struct BearerAuth {
    token: String,
}

impl Middleware<Request, Response> for BearerAuth {
    fn process(&self, req: Request, next: Next<'_>) -> Response {
        if matches!(req.path(), "/healthz" | "/readyz") {
            return next.handle(req);
        }

        let authorized = req.header("authorization")
            .and_then(|h| h.strip_prefix("Bearer "))
            .is_some_and(|t| t == self.token);

        if !authorized {
            return Response::status(StatusCode::UNAUTHORIZED);
        }
        next.handle(req)
    }
}

// ── Routes ────────────────────────────────────────────────────────────────────

// GET /users/{id}
fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users
//
// req.body() is &[u8]; parse with serde_json::from_slice, simd-json, etc.
fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#)
}

// DELETE /users/{id} → 204 No Content
fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}
