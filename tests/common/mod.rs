//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    response::IntoResponse,
    Router,
};
use futures_util::{stream, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing_subscriber::fmt::MakeWriter;

use xdjprox::{HttpServer, Lifecycle, LifecycleState, ProxyConfig, Shutdown};

/// What the mock backend saw.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub type Recorder = Arc<Mutex<Vec<Recorded>>>;

/// Start a backend that records each request and answers 200 with `response`.
pub async fn start_recording_backend(response: &'static str) -> (SocketAddr, Recorder) {
    start_backend(response, Duration::ZERO).await
}

/// Like [`start_recording_backend`] but waits `delay` before answering.
pub async fn start_slow_backend(response: &'static str, delay: Duration) -> (SocketAddr, Recorder) {
    start_backend(response, delay).await
}

async fn start_backend(response: &'static str, delay: Duration) -> (SocketAddr, Recorder) {
    let recorder: Recorder = Arc::new(Mutex::new(Vec::new()));
    let rec = recorder.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let rec = rec.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
            rec.lock().unwrap().push(Recorded {
                method: parts.method,
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body,
            });
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            (StatusCode::OK, response).into_response()
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, recorder)
}

/// Start a backend whose body is `first`, then a pause of `gap`, then `second`.
pub async fn start_streaming_backend(
    first: &'static str,
    gap: Duration,
    second: &'static str,
) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        let chunks = stream::iter([(first, Duration::ZERO), (second, gap)]).then(
            |(chunk, pause)| async move {
                tokio::time::sleep(pause).await;
                Ok::<_, io::Error>(Bytes::from_static(chunk.as_bytes()))
            },
        );
        Body::from_stream(chunks)
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that promises `Content-Length: 100`, sends `hello`, and hangs up.
pub async fn start_truncating_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nhello")
                    .await;
            });
        }
    });
    addr
}

/// A running proxy under test.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub lifecycle: Lifecycle,
    pub handle: JoinHandle<Result<(), io::Error>>,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the proxy in front of `backend` with `configure` applied.
pub async fn start_proxy(backend: SocketAddr, configure: impl FnOnce(&mut ProxyConfig)) -> TestProxy {
    let mut config = ProxyConfig::default();
    config.upstream.target_url = format!("http://{}", backend);
    config.listener.bind_address = "127.0.0.1:0".into();
    configure(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let lifecycle = server.lifecycle();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });
    lifecycle.wait_for(LifecycleState::Listening).await;

    TestProxy {
        addr,
        shutdown,
        lifecycle,
        handle,
    }
}

/// Send `GET <target>` verbatim over a fresh socket and return the raw response.
///
/// Bypasses client-side URL normalization, so dot segments reach the proxy.
pub async fn raw_get(addr: SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        target, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

/// Client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// In-memory log sink for asserting on log output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
