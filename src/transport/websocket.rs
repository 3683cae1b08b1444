//! WebSocket transport and IO loop.
//!
//! Connects to the upstream signals service, synthesizes the one-time
//! `worker:ready` announcement once the socket is established, and then
//! pumps messages in both directions from a spawned task.
//!
//! # IO Loop
//!
//! The loop handles:
//!
//! - Incoming frames from the service (parsed into [`Inbound`])
//! - Outbound posts from client handles
//! - Socket death, synthesized into a `connection:closed`/`connection:error`
//!   lifecycle message so the session state machine sees it like any other
//!   transport-reported event

// ============================================================================
// Imports
// ============================================================================

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{Inbound, Outbound};
use crate::transport::Transport;

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Internal commands for the IO loop.
enum IoCommand {
    /// Serialize and send an outbound message.
    Post(Outbound),
    /// Close the socket and stop the loop.
    Shutdown,
}

// ============================================================================
// WebSocketTransport
// ============================================================================

/// Shared channel transport over a WebSocket connection.
///
/// Cloning yields another handle onto the same connection; the socket and
/// its IO task are shared, mirroring a platform shared channel.
///
/// # Thread Safety
///
/// `WebSocketTransport` is `Send + Sync`; [`Transport::post`] is
/// non-blocking.
pub struct WebSocketTransport {
    command_tx: mpsc::UnboundedSender<IoCommand>,
}

impl Clone for WebSocketTransport {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
        }
    }
}

impl WebSocketTransport {
    /// Connects to the signals service at `endpoint`.
    ///
    /// Returns the transport handle plus the inbound message stream. The
    /// first delivered message is always `worker:ready`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEndpoint`] if `endpoint` is not a `ws`/`wss` URL
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn connect(endpoint: &str) -> Result<(Self, mpsc::UnboundedReceiver<Inbound>)> {
        validate_endpoint(endpoint)?;

        let (ws_stream, _) = connect_async(endpoint).await?;
        debug!(%endpoint, "WebSocket connected");

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        // The socket is usable now; announce readiness before any relayed
        // message so init gating observes it first.
        let _ = inbound_tx.send(Inbound::WorkerReady);

        tokio::spawn(run_io_loop(ws_stream, command_rx, inbound_tx));

        Ok((Self { command_tx }, inbound_rx))
    }

    /// Closes the socket and stops the IO loop.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(IoCommand::Shutdown);
    }
}

impl Transport for WebSocketTransport {
    fn post(&self, message: Outbound) {
        if self.command_tx.send(IoCommand::Post(message)).is_err() {
            warn!("Post after transport shutdown, message dropped");
        }
    }
}

// ============================================================================
// IO Loop
// ============================================================================

/// Pumps frames between the socket and the client channels.
async fn run_io_loop(
    ws_stream: WsStream,
    mut command_rx: mpsc::UnboundedReceiver<IoCommand>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
) {
    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        tokio::select! {
            // Incoming frames from the service
            frame = ws_read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(inbound) = parse_inbound(text.as_str()) {
                            if inbound_tx.send(inbound).is_err() {
                                debug!("Inbound receiver dropped, stopping IO loop");
                                break;
                            }
                        }
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!("WebSocket closed by remote");
                        let _ = inbound_tx.send(Inbound::ConnectionClosed {
                            message: Some("socket closed by remote".to_string()),
                        });
                        break;
                    }

                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        let _ = inbound_tx.send(Inbound::ConnectionError {
                            message: Some(e.to_string()),
                        });
                        break;
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        let _ = inbound_tx.send(Inbound::ConnectionClosed {
                            message: Some("socket stream ended".to_string()),
                        });
                        break;
                    }

                    // Ignore Binary, Ping, Pong frames
                    _ => {}
                }
            }

            // Outbound posts from client handles
            command = command_rx.recv() => {
                match command {
                    Some(IoCommand::Post(message)) => {
                        let name = message.name();
                        match serde_json::to_string(&message) {
                            Ok(json) => {
                                if let Err(e) = ws_write.send(Message::Text(json.into())).await {
                                    warn!(outbound = name, error = %e, "Failed to post message");
                                } else {
                                    trace!(outbound = name, "Message posted");
                                }
                            }
                            Err(e) => warn!(outbound = name, error = %e, "Failed to serialize message"),
                        }
                    }

                    Some(IoCommand::Shutdown) => {
                        debug!("Shutdown command received");
                        let _ = ws_write.close().await;
                        break;
                    }

                    None => {
                        debug!("Command channel closed");
                        break;
                    }
                }
            }
        }
    }

    debug!("IO loop terminated");
}

/// Parses an inbound frame, dropping unrecognized messages with a warning.
fn parse_inbound(text: &str) -> Option<Inbound> {
    match serde_json::from_str::<Inbound>(text) {
        Ok(inbound) => Some(inbound),
        Err(e) => {
            warn!(%text, error = %e, "Failed to parse inbound message");
            None
        }
    }
}

/// Validates that `endpoint` is a well-formed `ws`/`wss` URL.
fn validate_endpoint(endpoint: &str) -> Result<()> {
    let parsed = Url::parse(endpoint).map_err(|_| Error::invalid_endpoint(endpoint))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        _ => Err(Error::invalid_endpoint(endpoint)),
    }
}

// ============================================================================
// Tests
// ============================================================================
