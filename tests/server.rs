//! End-to-end: a middleware pipeline served over real TCP.

use std::net::TcpListener as StdListener;
use std::time::Duration;

use mwqueue::{
    Method, MiddlewareCollection, MiddlewarePipeline, Request, RequestHandler, Response, Router,
    Server, StatusCode, middleware_fn,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

type Next<'a> = &'a dyn RequestHandler<Request, Response>;

fn free_port() -> u16 {
    StdListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

fn pipeline() -> MiddlewarePipeline<Request, Response> {
    let app = Router::new()
        .on(Method::GET, "/hello", |_req: Request| "hello")
        .on(Method::POST, "/echo", |req: Request| Response::text(String::from_utf8_lossy(req.body()).into_owned()))
        .on(Method::GET, "/panic", |_req: Request| -> Response { panic!("boom") });

    let mut chain = MiddlewareCollection::new();
    chain
        .push(middleware_fn(|req: Request, next: Next<'_>| {
            let mut res = next.handle(req);
            res.headers_mut().insert("x-chain", "outer".parse().unwrap());
            res
        }))
        .set("auth", middleware_fn(|req: Request, next: Next<'_>| {
            if req.header("authorization") != Some("Bearer t") {
                return Response::status(StatusCode::UNAUTHORIZED);
            }
            next.handle(req)
        }));

    MiddlewarePipeline::new(chain, app)
}

async fn send(port: u16, raw: &str) -> String {
    let mut stream = None;
    for _ in 0..50 {
        match TcpStream::connect(("127.0.0.1", port)).await {
            Ok(s) => {
                stream = Some(s);
                break;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }
    let mut stream = stream.expect("server did not start");

    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

fn get(path: &str, auth: Option<&str>) -> String {
    let auth = auth.map(|t| format!("authorization: Bearer {t}\r\n")).unwrap_or_default();
    format!("GET {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n{auth}\r\n")
}

#[tokio::test]
async fn serves_a_pipeline_and_shuts_down() {
    let port = free_port();
    let server = Server::bind(&format!("127.0.0.1:{port}")).unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let running = tokio::spawn(server.serve_with_shutdown(pipeline(), async {
        let _ = stop_rx.await;
    }));

    let ok = send(port, &get("/hello", Some("t"))).await;
    assert!(ok.starts_with("HTTP/1.1 200"), "{ok}");
    assert!(ok.contains("x-chain: outer"), "{ok}");
    assert!(ok.ends_with("hello"), "{ok}");

    // Short-circuited by auth, but the outer middleware still wraps it.
    let denied = send(port, &get("/hello", None)).await;
    assert!(denied.starts_with("HTTP/1.1 401"), "{denied}");
    assert!(denied.contains("x-chain: outer"), "{denied}");

    let missing = send(port, &get("/nope", Some("t"))).await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    let echoed = send(
        port,
        "POST /echo HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\
         authorization: Bearer t\r\ncontent-length: 5\r\n\r\nhowdy",
    )
    .await;
    assert!(echoed.starts_with("HTTP/1.1 200"), "{echoed}");
    assert!(echoed.ends_with("howdy"), "{echoed}");

    let panicked = send(port, &get("/panic", Some("t"))).await;
    assert!(panicked.starts_with("HTTP/1.1 500"), "{panicked}");

    stop_tx.send(()).unwrap();
    running.await.unwrap().unwrap();
}

#[test]
fn bind_rejects_invalid_address() {
    let err = Server::bind("localhost").unwrap_err();
    assert!(err.to_string().starts_with("invalid socket address `localhost`"), "{err}");
}
