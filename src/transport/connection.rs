//! WebSocket connection and event loop.
//!
//! One call to [`run_event_loop`] drives one socket from the moment the
//! `Auth` frame is sent until it closes. The loop handles:
//!
//! - Incoming frames from the server, dispatched strictly in arrival order
//! - Outgoing client messages relayed from the session handle
//! - Local shutdown (close code 1000)
//! - Closure classification when the server or network ends the connection

// ============================================================================
// Imports
// ============================================================================

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::ClientMessage;

use super::closure::Closure;
use super::dispatch::Dispatcher;

// ============================================================================
// Constants
// ============================================================================

/// Reason sent with the close frame on local disconnect.
pub(crate) const LOCAL_CLOSE_REASON: &str = "Disconnected by user";

// ============================================================================
// Types
// ============================================================================

/// Client-side WebSocket stream.
pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Channel carrying client messages into the event loop.
pub(crate) type OutboundRx = mpsc::UnboundedReceiver<ClientMessage>;

/// How a connection ended.
#[derive(Debug)]
pub(crate) enum ConnectionEnd {
    /// Local disconnect.
    Local,
    /// Server close frame, network error, or end of stream.
    Remote {
        /// Classified closure.
        closure: Closure,
        /// Whether this connection reached `Authenticated`.
        authenticated: bool,
    },
}

// ============================================================================
// Connect
// ============================================================================

/// Opens a socket and sends the `Auth` handshake as the first frame.
///
/// # Errors
///
/// - [`Error::Connection`] if the WebSocket handshake fails
/// - [`Error::WebSocket`] if the `Auth` frame cannot be written
pub(crate) async fn connect(url: &Url, hello: &ClientMessage) -> Result<WsStream> {
    let (mut ws_stream, response) = connect_async(url.as_str())
        .await
        .map_err(|e| Error::connection(format!("{url}: {e}")))?;

    debug!(%url, status = %response.status(), "WebSocket connection opened, authenticating");

    ws_stream.send(Message::Text(hello.to_json()?.into())).await?;

    trace!("Auth sent");
    Ok(ws_stream)
}

// ============================================================================
// Event Loop
// ============================================================================

/// Drives one connection until it ends.
pub(crate) async fn run_event_loop(
    ws_stream: WsStream,
    mut dispatcher: Dispatcher,
    mut outbound_rx: OutboundRx,
    shutdown: CancellationToken,
) -> ConnectionEnd {
    let (mut ws_write, mut ws_read) = ws_stream.split();
    let mut outbound_open = true;

    let closure = loop {
        tokio::select! {
            biased;

            // Local disconnect
            () = shutdown.cancelled() => {
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: String::from(LOCAL_CLOSE_REASON).into(),
                };
                if let Err(e) = ws_write.send(Message::Close(Some(frame))).await {
                    debug!(error = %e, "Close frame not delivered");
                }
                debug!("Connection closed locally");
                return ConnectionEnd::Local;
            }

            // Incoming frames from the server
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => dispatcher.dispatch(&text),

                    Some(Ok(Message::Close(frame))) => {
                        let closure = Closure::from_frame(frame.as_ref());
                        debug!(code = closure.code, reason = %closure.reason, "WebSocket closed by remote");
                        break closure;
                    }

                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break Closure::abnormal();
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        break Closure::abnormal();
                    }

                    // Ignore Binary, Ping, Pong
                    Some(Ok(_)) => {}
                }
            }

            // Messages from the session handle
            outgoing = outbound_rx.recv(), if outbound_open => {
                match outgoing {
                    Some(message) => send_client_message(&mut ws_write, &message).await,
                    None => outbound_open = false,
                }
            }
        }
    };

    ConnectionEnd::Remote {
        closure,
        authenticated: dispatcher.authenticated(),
    }
}

/// Serializes and writes one client message.
///
/// Write failures are only logged; the read side observes the broken socket.
async fn send_client_message<S>(ws_write: &mut S, message: &ClientMessage)
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = match message.to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize client message");
            return;
        }
    };

    match ws_write.send(Message::Text(json.into())).await {
        Ok(()) => trace!(?message, "Client message sent"),
        Err(e) => warn!(error = %e, "Failed to send client message"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::identifiers::{GameId, UserId};
    use crate::test_support::{WsServer, init_tracing};

    fn hello() -> ClientMessage {
        ClientMessage::auth(
            GameId::new("g1").expect("game id"),
            UserId::new("alice").expect("user id"),
        )
    }

    #[test]
    fn test_local_close_reason() {
        assert_eq!(LOCAL_CLOSE_REASON, "Disconnected by user");
    }

    #[tokio::test]
    async fn test_connect_sends_auth_first() {
        init_tracing();
        let server = WsServer::bind().await;
        let url = Url::parse(&server.url()).expect("url");

        let client = tokio::spawn(async move { connect(&url, &hello()).await });
        let mut peer = server.accept().await;

        let first = peer.recv_json().await;
        assert_eq!(first["kind"], "Auth");
        assert_eq!(first["value"]["game_id"], "g1");
        assert_eq!(first["value"]["user_id"], "alice");

        client.await.expect("join").expect("connect");
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let server = WsServer::bind().await;
        let url = Url::parse(&server.url()).expect("url");
        drop(server);

        let err = connect(&url, &hello()).await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }
}
