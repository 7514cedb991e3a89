//! WebSocket transport adapter
//!
//! Connects to the chat server, decodes inbound frames into validated
//! [`InboundEvent`]s and writes [`OutboundEvent`]s as text frames. The
//! adapter synthesizes the lifecycle events itself: `connect` when the
//! handshake completes, `connect_error` when it fails and `disconnect` when
//! the socket closes. With a [`Backoff`] it keeps reconnecting after either
//! failure until every handle is dropped or the session stops listening.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, SendError};
use crate::message::{decode_inbound, InboundEvent, OutboundEvent};

/// Fire-and-forget sink for outbound events
pub trait Emitter {
    fn emit(&self, event: OutboundEvent) -> Result<(), SendError>;
}

impl Emitter for mpsc::UnboundedSender<OutboundEvent> {
    fn emit(&self, event: OutboundEvent) -> Result<(), SendError> {
        self.send(event).map_err(|_| SendError::ChannelClosed)
    }
}

/// Handle to a running connection task
///
/// Dropping every clone of the handle closes the socket.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    outbound: mpsc::UnboundedSender<OutboundEvent>,
    abort_handle: AbortHandle,
}

impl TransportHandle {
    /// Abort the connection task immediately
    pub fn abort(&self) {
        self.abort_handle.abort();
    }
}

impl Emitter for TransportHandle {
    fn emit(&self, event: OutboundEvent) -> Result<(), SendError> {
        self.outbound.emit(event)
    }
}

/// Exponential reconnect delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    /// Delay before retry `attempt` (0-based), doubling up to the cap
    pub fn base_delay(&self, attempt: u32) -> Duration {
        self.initial
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max)
    }

    /// Base delay plus up to a tenth of random jitter
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        let spread = (base.as_millis() / 10) as u64;
        if spread == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=spread))
    }
}

/// Start connecting to `url`
///
/// Returns immediately; connection progress arrives as inbound events.
pub fn connect(
    url: String,
    capacity: usize,
    reconnect: Option<Backoff>,
) -> (TransportHandle, mpsc::Receiver<InboundEvent>) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::channel(capacity);

    let task = tokio::spawn(run_connection(url, reconnect, outbound_rx, inbound_tx));

    let handle = TransportHandle {
        outbound: outbound_tx,
        abort_handle: task.abort_handle(),
    };
    (handle, inbound_rx)
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a connection stopped pumping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closed {
    /// The server closed the socket
    Remote,
    /// Every handle was dropped or the session stopped listening
    Local,
}

/// Connect, pump, and reconnect until shut down locally
async fn run_connection(
    url: String,
    reconnect: Option<Backoff>,
    mut outbound: mpsc::UnboundedReceiver<OutboundEvent>,
    inbound: mpsc::Sender<InboundEvent>,
) {
    let mut attempt: u32 = 0;

    loop {
        debug!("Connecting to {}", url);

        let lost = match open(&url).await {
            Ok(ws_stream) => {
                info!("WebSocket handshake with {} complete", url);
                attempt = 0;
                if inbound.send(InboundEvent::Connect { id: None }).await.is_err() {
                    return;
                }

                let closed = match pump(ws_stream, &mut outbound, &inbound).await {
                    Ok(closed) => closed,
                    Err(e) => {
                        error!("Connection to {} failed: {}", url, e);
                        Closed::Remote
                    }
                };
                info!("Connection to {} closed", url);
                if inbound.send(InboundEvent::Disconnect).await.is_err() || closed == Closed::Local {
                    return;
                }
                "disconnect"
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", url, e);
                let event = InboundEvent::ConnectError {
                    detail: e.to_string(),
                };
                if inbound.send(event).await.is_err() {
                    return;
                }
                "connect error"
            }
        };

        let Some(backoff) = reconnect else {
            debug!("Reconnect disabled, transport stopping");
            return;
        };
        let delay = backoff.delay(attempt);
        attempt = attempt.saturating_add(1);
        info!("Reconnecting to {} in {:?} after {}", url, delay, lost);

        if !wait_before_retry(delay, &mut outbound, &inbound).await {
            debug!("Transport shut down while waiting to reconnect");
            return;
        }
    }
}

/// Sleep out a reconnect delay
///
/// Returns false if the transport was shut down meanwhile. Outbound events
/// have no socket to go to and are dropped.
async fn wait_before_retry(
    delay: Duration,
    outbound: &mut mpsc::UnboundedReceiver<OutboundEvent>,
    inbound: &mpsc::Sender<InboundEvent>,
) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            _ = inbound.closed() => return false,
            event = outbound.recv() => match event {
                Some(event) => warn!("Not connected, dropping outbound '{}'", event.name()),
                None => return false,
            },
        }
    }
}

/// WebSocket handshake
async fn open(url: &str) -> Result<WsStream, AppError> {
    let (ws_stream, _response) = tokio_tungstenite::connect_async(url).await?;
    Ok(ws_stream)
}

/// Bridge between the WebSocket and the event channels
///
/// Returns which side ended an orderly close.
async fn pump(
    ws_stream: WsStream,
    outbound: &mut mpsc::UnboundedReceiver<OutboundEvent>,
    inbound: &mpsc::Sender<InboundEvent>,
) -> Result<Closed, AppError> {
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    loop {
        tokio::select! {
            frame = ws_receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => match decode_inbound(&text) {
                    Ok(event) => {
                        if inbound.send(event).await.is_err() {
                            debug!("Session closed, ending connection");
                            let _ = ws_sender.close().await;
                            return Ok(Closed::Local);
                        }
                    }
                    Err(e) => {
                        warn!("Dropping inbound frame: {}", e);
                    }
                },
                Some(Ok(Message::Close(_))) => {
                    debug!("Server sent close frame");
                    return Ok(Closed::Remote);
                }
                Some(Ok(_)) => {
                    // Ping/pong are answered by tungstenite; binary is not part of the protocol
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    debug!("WebSocket stream ended");
                    return Ok(Closed::Remote);
                }
            },
            event = outbound.recv() => match event {
                Some(event) => {
                    let json = event.encode()?;
                    ws_sender.send(Message::Text(json.into())).await?;
                }
                None => {
                    debug!("All transport handles dropped, closing socket");
                    ws_sender.close().await?;
                    return Ok(Closed::Local);
                }
            },
        }
    }
}
