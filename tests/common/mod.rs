//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket};

use rr_proxy::config::TimeoutConfig;
use rr_proxy::health::LivenessSwitch;
use rr_proxy::load_balancer::{build_client, Backend, Dispatcher, SimpleBackend};
use rr_proxy::{HttpServer, Shutdown};

/// Start a raw TCP backend that answers every request with a fixed body.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                // Drain the request head so closing does not reset the connection.
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                let response_str = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response.len(),
                    response
                );
                let _ = socket.write_all(response_str.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a raw TCP backend whose response carries hop-by-hop headers and a
/// chunked body with a pause of `gap` between its two chunks.
///
/// Sends `x-e2e: yes`, `x-hop: 1` (listed in `Connection`) and `Keep-Alive`,
/// then `first`, then `second` after the pause.
pub async fn start_slow_chunked_backend(gap: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                let head = "HTTP/1.1 200 OK\r\n\
                    Connection: x-hop\r\n\
                    x-hop: 1\r\n\
                    Keep-Alive: timeout=5\r\n\
                    x-e2e: yes\r\n\
                    Transfer-Encoding: chunked\r\n\r\n\
                    5\r\nfirst\r\n";
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                let _ = socket.flush().await;

                tokio::time::sleep(gap).await;
                let _ = socket.write_all(b"6\r\nsecond\r\n0\r\n\r\n").await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start an axum backend that echoes what it received.
///
/// Responds with header `x-backend: <name>` and a `key=value` line body.
/// A request header `x-echo-status` selects the response status.
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let app = Router::new().fallback(move |request: Request<Body>| echo(name, request));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

async fn echo(name: &'static str, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, 1024 * 1024)
        .await
        .unwrap_or_default();

    let header = |n: &str| {
        parts
            .headers
            .get(n)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string()
    };

    let status = header("x-echo-status")
        .parse::<u16>()
        .ok()
        .and_then(|c| StatusCode::from_u16(c).ok())
        .unwrap_or(StatusCode::OK);

    let text = format!(
        "backend={}\nmethod={}\nuri={}\nhost={}\nx-custom={}\nx-forwarded-for={}\nconnection={}\nbody={}",
        name,
        parts.method,
        parts.uri,
        header("host"),
        header("x-custom"),
        header("x-forwarded-for"),
        header("connection"),
        String::from_utf8_lossy(&body),
    );

    (status, [("x-backend", name)], text).into_response()
}

/// Parse an echo body into (key, value) pairs.
pub fn parse_echo(body: &str) -> std::collections::HashMap<String, String> {
    body.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// An address that refuses connections.
///
/// The port stays bound (but never listens) while the returned socket lives,
/// so nothing else can claim it mid-test.
pub fn closed_addr() -> (SocketAddr, TcpSocket) {
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = socket.local_addr().unwrap();
    (addr, socket)
}

/// Build a pool of simple backends, each with its own liveness switch.
pub fn simple_pool(addrs: &[SocketAddr]) -> (Vec<Arc<dyn Backend>>, Vec<Arc<LivenessSwitch>>) {
    let client = build_client(&TimeoutConfig::default());
    let mut backends: Vec<Arc<dyn Backend>> = Vec::new();
    let mut switches = Vec::new();

    for addr in addrs {
        let switch = Arc::new(LivenessSwitch::default());
        let backend = SimpleBackend::new(format!("http://{}", addr), client.clone())
            .unwrap()
            .with_liveness(switch.clone())
            .with_upstream_timeout(Duration::from_secs(5));
        backends.push(Arc::new(backend));
        switches.push(switch);
    }

    (backends, switches)
}

/// Run the front door on an ephemeral port.
pub async fn start_proxy(dispatcher: Arc<Dispatcher>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(dispatcher);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
