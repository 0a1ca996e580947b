use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN,
};
use hyper::client::conn::http1::SendRequest;
use hyper::{HeaderMap, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use stuff_server::config::{AppState, Config};
use stuff_server::provider::{FileProvider, InlineProvider, StuffProvider};
use stuff_server::server;

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(provider: Arc<dyn StuffProvider>) -> Self {
        Self::start_with(test_config(), provider).await
    }

    async fn start_with(config: Config, provider: Arc<dyn StuffProvider>) -> Self {
        let state = Arc::new(AppState::new(config, provider).unwrap());

        let listener = server::create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(server::serve(listener, state, async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            task,
        }
    }

    async fn connect(&self) -> SendRequest<Full<Bytes>> {
        let stream = TcpStream::connect(self.addr).await.unwrap();
        let (sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        tokio::spawn(conn);
        sender
    }

    async fn send(&self, req: Request<Full<Bytes>>) -> (StatusCode, HeaderMap, Bytes) {
        let mut sender = self.connect().await;
        let response = sender.send_request(req).await.unwrap();
        let (parts, body) = response.into_parts();
        let body = body.collect().await.unwrap().to_bytes();
        (parts.status, parts.headers, body)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task.await.unwrap();
    }
}

fn test_config() -> Config {
    let mut config = Config::defaults().unwrap();
    config.logging.access_log = false;
    config.performance.shutdown_timeout = 1;
    config
}

fn request(method: &str, path: &str) -> hyper::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(path)
        .header("host", "localhost")
}

fn empty() -> Full<Bytes> {
    Full::new(Bytes::new())
}

#[tokio::test]
async fn mounted_route_returns_payload_for_every_method() {
    let provider = Arc::new(InlineProvider::new(serde_json::json!({ "stuff": ["a", "b"] })));
    let server = TestServer::start(provider).await;

    for method in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
        let (status, headers, body) = server.send(request(method, "/api").body(empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK, "method {method}");
        assert_eq!(headers[CONTENT_TYPE], "application/json; charset=utf-8");
        assert_eq!(&body[..], br#"{"stuff":["a","b"]}"#);
    }

    server.stop().await;
}

#[tokio::test]
async fn foreign_origin_is_still_served() {
    let provider = Arc::new(InlineProvider::new(serde_json::json!([1, 2, 3])));
    let server = TestServer::start(provider).await;

    let req = request("GET", "/api/anything?q=1")
        .header(ORIGIN, "https://evil.example")
        .body(empty())
        .unwrap();
    let (status, headers, body) = server.send(req).await;
    assert_eq!(status, StatusCode::OK);
    // Only the configured origin is ever advertised
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://localhost:3000");
    assert_eq!(&body[..], b"[1,2,3]");

    server.stop().await;
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let provider = Arc::new(InlineProvider::new(serde_json::json!({})));
    let server = TestServer::start(provider).await;

    let (status, headers, body) = server.send(request("GET", "/other").body(empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers[CONTENT_TYPE], "text/html; charset=utf-8");
    assert!(String::from_utf8_lossy(&body).contains("Cannot GET /other"));

    server.stop().await;
}

#[tokio::test]
async fn preflight_is_answered_without_routing() {
    let provider = Arc::new(InlineProvider::new(serde_json::json!({})));
    let server = TestServer::start(provider).await;

    let req = request("OPTIONS", "/api")
        .header(ORIGIN, "https://localhost:3000")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(empty())
        .unwrap();
    let (status, headers, body) = server.send(req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://localhost:3000");
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET,HEAD,PUT,PATCH,POST,DELETE");
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "content-type");
    assert!(body.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn json_body_errors_are_reported() {
    let provider = Arc::new(InlineProvider::new(serde_json::json!({})));
    let mut config = test_config();
    config.http.max_body_size = 64;
    let server = TestServer::start_with(config, provider).await;

    let malformed = request("POST", "/api")
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from_static(b"{\"a\":")))
        .unwrap();
    let (status, headers, _) = server.send(malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

    let oversized = format!("[{}]", vec!["1"; 100].join(","));
    let too_large = request("POST", "/api")
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(oversized)))
        .unwrap();
    let (status, _, _) = server.send(too_large).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    // Non-JSON bodies are never parsed
    let text = request("POST", "/api")
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from_static(b"{\"a\":")))
        .unwrap();
    let (status, _, _) = server.send(text).await;
    assert_eq!(status, StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn connections_over_the_cap_are_refused() {
    let provider = Arc::new(InlineProvider::new(serde_json::json!({})));
    let mut config = test_config();
    config.performance.max_connections = Some(1);
    let server = TestServer::start_with(config, provider).await;

    // A completed exchange proves the first connection was accepted;
    // keep-alive holds it open
    let mut first = server.connect().await;
    let response = first
        .send_request(request("GET", "/api").body(empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut second = server.connect().await;
    let refused = second
        .send_request(request("GET", "/api").body(empty()).unwrap())
        .await;
    assert!(refused.is_err());

    drop(first);
    server.stop().await;
}

#[tokio::test]
async fn provider_failure_is_internal_error() {
    let provider = Arc::new(FileProvider::new("/nonexistent/stuff.json"));
    let server = TestServer::start(provider).await;

    let (status, headers, _) = server.send(request("GET", "/api").body(empty()).unwrap()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://localhost:3000");

    server.stop().await;
}

#[tokio::test]
async fn file_provider_reflects_current_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stuff.json");
    std::fs::write(&path, r#"{"version":1}"#).unwrap();

    let server = TestServer::start(Arc::new(FileProvider::new(&path))).await;

    let (_, _, body) = server.send(request("GET", "/api").body(empty()).unwrap()).await;
    assert_eq!(&body[..], br#"{"version":1}"#);

    std::fs::write(&path, r#"{"version":2}"#).unwrap();
    let (_, _, body) = server.send(request("GET", "/api").body(empty()).unwrap()).await;
    assert_eq!(&body[..], br#"{"version":2}"#);

    server.stop().await;
}
