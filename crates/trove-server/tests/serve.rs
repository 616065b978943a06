//! Real-socket tests for the server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use trove_core::{handler_fn, response, Request, RequestContext};
use trove_server::{Router, Server, ServerConfig, ShutdownSignal};

async fn start(router: Router, config: ServerConfig) -> (SocketAddr, ShutdownSignal, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let server = Server::new(config, Arc::new(router));
    let handle = tokio::spawn(server.serve(listener, shutdown.clone()));
    (addr, shutdown, handle)
}

async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

fn status_line(raw: &str) -> &str {
    raw.lines().next().unwrap_or_default()
}

fn echo_router() -> Router {
    let router = Router::new();
    router
        .handle_func(
            Method::GET,
            "/collections/:id",
            handler_fn(|ctx: RequestContext, _req| async move {
                let id = ctx.param("id").unwrap_or_default().to_owned();
                response::json(StatusCode::OK, &serde_json::json!({ "id": id }))
            }),
        )
        .unwrap();
    router
        .handle_func(
            Method::POST,
            "/echo",
            handler_fn(|_ctx, req: Request| async move {
                let body = response::body_bytes(req.into_body()).await;
                response::text(StatusCode::OK, body)
            }),
        )
        .unwrap();
    router
}

#[tokio::test]
async fn test_serves_matched_route() {
    let (addr, shutdown, handle) = start(echo_router(), ServerConfig::default()).await;

    let raw = raw_request(
        addr,
        "GET /collections/17 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert_eq!(status_line(&raw), "HTTP/1.1 200 OK");
    assert!(raw.contains("application/json"));
    assert!(raw.ends_with(r#"{"id":"17"}"#));

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_unmatched_route_is_404() {
    let (addr, shutdown, handle) = start(echo_router(), ServerConfig::default()).await;

    let raw = raw_request(
        addr,
        "GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert_eq!(status_line(&raw), "HTTP/1.1 404 Not Found");
    assert!(raw.ends_with("404 page not found\n"));

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_body_is_forwarded() {
    let (addr, shutdown, handle) = start(echo_router(), ServerConfig::default()).await;

    let raw = raw_request(
        addr,
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
    )
    .await;
    assert_eq!(status_line(&raw), "HTTP/1.1 200 OK");
    assert!(raw.ends_with("hello"));

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = ServerConfig::builder().max_body_size(4).build();
    let (addr, shutdown, handle) = start(echo_router(), config).await;

    let raw = raw_request(
        addr,
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 11\r\nConnection: close\r\n\r\nhello world",
    )
    .await;
    assert_eq!(status_line(&raw), "HTTP/1.1 413 Payload Too Large");
    assert!(raw.contains("Request body too large"));

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let config = ServerConfig::builder()
        .shutdown_timeout(Duration::from_millis(200))
        .build();
    let (addr, shutdown, handle) = start(echo_router(), config).await;

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop")
        .unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}
