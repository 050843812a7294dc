//! In-process servers for tests.
//!
//! [`WsServer`] plays the game server; [`HttpStub`] plays the matchmaking
//! and engine services with scripted replies.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::debug;

use crate::protocol::ServerMessage;

// ============================================================================
// Constants
// ============================================================================

/// Upper bound for any single wait in a test.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Tracing
// ============================================================================

/// Installs a test-writer subscriber once; `RUST_LOG` controls verbosity.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// WsServer
// ============================================================================

/// A WebSocket listener standing in for the game server.
pub(crate) struct WsServer {
    listener: TcpListener,
    port: u16,
}

impl WsServer {
    /// Binds to a random localhost port.
    pub(crate) async fn bind() -> Self {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind should succeed");
        let port = listener.local_addr().expect("local addr").port();
        debug!(port, "Test WebSocket server bound");
        Self { listener, port }
    }

    /// Returns `ws://127.0.0.1:{port}/ws`.
    pub(crate) fn url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    /// Accepts the next client and completes the WebSocket upgrade.
    pub(crate) async fn accept(&self) -> WsPeer {
        let (stream, _addr) = self.listener.accept().await.expect("accept should succeed");
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("upgrade should succeed");
        WsPeer { ws }
    }
}

/// Server side of one accepted client.
pub(crate) struct WsPeer {
    ws: WebSocketStream<TcpStream>,
}

impl WsPeer {
    /// Waits for the next text frame and parses it as JSON.
    pub(crate) async fn recv_json(&mut self) -> serde_json::Value {
        loop {
            let message = timeout(TEST_TIMEOUT, self.ws.next())
                .await
                .expect("frame within timeout")
                .expect("stream open")
                .expect("frame ok");

            if let Message::Text(text) = message {
                return serde_json::from_str(text.as_str()).expect("client sent JSON");
            }
        }
    }

    /// Waits for the client's close frame and returns its code and reason.
    pub(crate) async fn recv_close(&mut self) -> (u16, String) {
        loop {
            let message = timeout(TEST_TIMEOUT, self.ws.next())
                .await
                .expect("frame within timeout")
                .expect("stream open")
                .expect("frame ok");

            if let Message::Close(frame) = message {
                let frame = frame.expect("close frame carries a status");
                return (u16::from(frame.code), frame.reason.as_str().to_string());
            }
        }
    }

    /// Sends a raw text frame.
    pub(crate) async fn send_text(&mut self, text: &str) {
        self.ws
            .send(Message::Text(String::from(text).into()))
            .await
            .expect("send should succeed");
    }

    /// Sends a server message in wire form.
    pub(crate) async fn send(&mut self, message: &ServerMessage) {
        let json = serde_json::to_string(message).expect("serialize");
        self.send_text(&json).await;
    }

    /// Closes with `code` and `reason`, then waits for the socket to end.
    pub(crate) async fn close(mut self, code: u16, reason: &str) {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: String::from(reason).into(),
        };
        let _ = self.ws.send(Message::Close(Some(frame))).await;

        let _ = timeout(TEST_TIMEOUT, async {
            while let Some(Ok(_)) = self.ws.next().await {}
        })
        .await;
    }
}

// ============================================================================
// HttpStub
// ============================================================================

/// Scripted reply for one HTTP request.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Respond with a status and JSON body.
    Respond { status: u16, body: String },
    /// Read the request and never answer.
    Hang,
}

impl Reply {
    /// A `200 OK` with `body`.
    pub(crate) fn ok(body: impl Into<String>) -> Self {
        Self::Respond {
            status: 200,
            body: body.into(),
        }
    }

    /// A reply with `status` and `body`.
    pub(crate) fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Respond {
            status,
            body: body.into(),
        }
    }
}

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) body: String,
}

#[derive(Default)]
struct StubShared {
    script: Mutex<VecDeque<Reply>>,
    fallback: Mutex<Option<Reply>>,
    requests: Mutex<Vec<Recorded>>,
    hits: AtomicUsize,
    hit: Notify,
}

/// Minimal HTTP/1.1 server answering from a script.
///
/// Scripted replies are used in order; once exhausted the fallback is used
/// for every further request.
pub(crate) struct HttpStub {
    port: u16,
    shared: Arc<StubShared>,
    task: tokio::task::JoinHandle<()>,
}

impl HttpStub {
    /// Starts the stub with a reply script and no fallback.
    pub(crate) async fn start(script: Vec<Reply>) -> Self {
        Self::start_with_fallback(script, None).await
    }

    /// Starts the stub with a reply script and a fallback reply.
    pub(crate) async fn start_with_fallback(script: Vec<Reply>, fallback: Option<Reply>) -> Self {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind should succeed");
        let port = listener.local_addr().expect("local addr").port();

        let shared = Arc::new(StubShared {
            script: Mutex::new(script.into()),
            fallback: Mutex::new(fallback),
            ..StubShared::default()
        });

        let task_shared = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _addr)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(serve(stream, Arc::clone(&task_shared)));
            }
        });

        Self { port, shared, task }
    }

    /// Returns `http://127.0.0.1:{port}`.
    pub(crate) fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Number of requests received so far.
    pub(crate) fn hits(&self) -> usize {
        self.shared.hits.load(Ordering::SeqCst)
    }

    /// All requests received so far.
    pub(crate) fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().clone()
    }

    /// Waits until at least `count` requests arrived.
    pub(crate) async fn wait_for_hits(&self, count: usize) {
        timeout(TEST_TIMEOUT, async {
            loop {
                let notified = self.shared.hit.notified();
                if self.hits() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .expect("requests within timeout");
    }
}

impl Drop for HttpStub {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut stream: TcpStream, shared: Arc<StubShared>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };

    let reply = {
        let scripted = shared.script.lock().pop_front();
        scripted.or_else(|| shared.fallback.lock().clone())
    };

    shared.requests.lock().push(request);
    shared.hits.fetch_add(1, Ordering::SeqCst);
    shared.hit.notify_waiters();

    match reply {
        Some(Reply::Respond { status, body }) => {
            let response = format!(
                "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        Some(Reply::Hang) => {
            let mut sink = [0u8; 64];
            while let Ok(n) = stream.read(&mut sink).await {
                if n == 0 {
                    break;
                }
            }
        }
        None => {
            let response = "HTTP/1.1 500 Stub\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
            let _ = stream.write_all(response.as_bytes()).await;
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(Recorded { method, path, body })
}

/// HTTP client that ignores proxy environment variables.
pub(crate) fn test_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client should build")
}
