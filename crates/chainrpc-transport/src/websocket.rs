//! WebSocket client using `tokio-tungstenite`.
//!
//! One persistent connection per client. A single receive loop reads every
//! frame and routes it:
//!
//! ```text
//!                      ┌──────────────┐  Ok(result)  ┌─────────────────┐
//!   socket ──frames──► │ receive loop │─────────────►│ results (cap 10)│ blocking send
//!                      │              │  error/junk  ├─────────────────┤
//!                      │              │─────────────►│ errors  (cap 1) │ dropped when full
//!                      └──────────────┘              └─────────────────┘
//! ```
//!
//! Pings are answered by tungstenite itself: the pong is queued when the
//! ping is read and flushed on the loop's next read.
//!
//! The loop is the only writer to both channels and the only place that
//! closes them: when it exits (read failure, close frame, or [`WsClient::stop`])
//! it drops both senders, so receivers see `None` exactly once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chainrpc_protocol::{Codec, JsonCodec, ProtocolError, RawResult, RequestEnvelope, ResponseEnvelope};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, watch};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::address::RemoteAddr;
use crate::config::WsConfig;
use crate::stream::{Stream, dial};
use crate::TransportError;

type WsStream = WebSocketStream<Stream>;
type WsSink = SplitSink<WsStream, Message>;

/// Lifecycle of a [`WsClient`]. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Created,
    Dialing,
    Connected,
    Stopped,
}

/// The receiving ends handed out by [`WsClient::start`].
///
/// Both channels close when the receive loop exits.
#[derive(Debug)]
pub struct WsEvents {
    /// Raw results of successful responses, in wire order.
    pub results: mpsc::Receiver<RawResult>,
    /// Malformed frames and error responses.
    pub errors: mpsc::Receiver<ProtocolError>,
}

struct Shared {
    remote: RemoteAddr,
    endpoint: String,
    config: WsConfig,
    state: watch::Sender<ClientState>,
    sink: Mutex<Option<WsSink>>,
}

impl Shared {
    /// Writes one frame under the configured write deadline. Writers are
    /// serialized by the sink mutex.
    async fn write(&self, message: Message) -> Result<(), TransportError> {
        let deadline = self.config.write_timeout;
        let write = async {
            let mut sink = self.sink.lock().await;
            let sink = sink.as_mut().ok_or(TransportError::NotConnected)?;
            sink.send(message).await?;
            Ok::<(), TransportError>(())
        };
        tokio::time::timeout(deadline, write)
            .await
            .map_err(|_| TransportError::Timeout(deadline))?
    }

    fn mark_stopped(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == ClientState::Stopped {
                return false;
            }
            *state = ClientState::Stopped;
            true
        })
    }
}

impl fmt::Display for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.remote.host(), self.endpoint)
    }
}

// ---------------------------------------------------------------------------
// WsClient
// ---------------------------------------------------------------------------

/// A subscription client over one WebSocket connection.
///
/// Cloning gives another handle to the same connection. Dropping the
/// handles does not close the connection; call [`stop`](Self::stop).
///
/// There is no reconnect: once the loop exits the client stays
/// [`ClientState::Stopped`].
#[derive(Clone)]
pub struct WsClient {
    shared: Arc<Shared>,
}

impl WsClient {
    /// Creates a client for `remote` that will connect to `endpoint`
    /// (e.g. `/websocket`).
    pub fn new(remote: &str, endpoint: &str) -> Result<Self, TransportError> {
        Self::with_config(remote, endpoint, WsConfig::default())
    }

    pub fn with_config(
        remote: &str,
        endpoint: &str,
        config: WsConfig,
    ) -> Result<Self, TransportError> {
        Ok(Self::from_parts(RemoteAddr::parse(remote)?, endpoint, config))
    }

    pub fn from_parts(remote: RemoteAddr, endpoint: impl Into<String>, config: WsConfig) -> Self {
        let (state, _) = watch::channel(ClientState::Created);
        Self {
            shared: Arc::new(Shared {
                remote,
                endpoint: endpoint.into(),
                config,
                state,
                sink: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> ClientState {
        *self.shared.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ClientState::Connected
    }

    /// Dials, performs the WebSocket handshake, and spawns the receive loop.
    ///
    /// # Errors
    /// - [`TransportError::AlreadyStarted`] if called more than once.
    /// - Dial and handshake failures; the client is then `Stopped`.
    /// - [`TransportError::ConnectionClosed`] if [`stop`](Self::stop) ran
    ///   while dialing.
    pub async fn start(&self) -> Result<WsEvents, TransportError> {
        let claimed = self.shared.state.send_if_modified(|state| {
            if *state != ClientState::Created {
                return false;
            }
            *state = ClientState::Dialing;
            true
        });
        if !claimed {
            return Err(TransportError::AlreadyStarted);
        }

        let ws = match self.connect().await {
            Ok(ws) => ws,
            Err(e) => {
                self.shared.mark_stopped();
                return Err(e);
            }
        };
        let (sink, stream) = ws.split();
        *self.shared.sink.lock().await = Some(sink);

        let connected = self.shared.state.send_if_modified(|state| {
            if *state != ClientState::Dialing {
                return false;
            }
            *state = ClientState::Connected;
            true
        });
        if !connected {
            close_sink(&self.shared).await;
            return Err(TransportError::ConnectionClosed(
                "stopped while dialing".to_owned(),
            ));
        }

        let config = &self.shared.config;
        let (results_tx, results) = mpsc::channel(config.results_capacity.max(1));
        let (errors_tx, errors) = mpsc::channel(config.errors_capacity.max(1));
        tokio::spawn(receive_loop(
            Arc::clone(&self.shared),
            stream,
            results_tx,
            errors_tx,
        ));

        tracing::info!(client = %self, "websocket connected");
        Ok(WsEvents { results, errors })
    }

    async fn connect(&self) -> Result<WsStream, TransportError> {
        let remote = &self.shared.remote;
        let stream = dial(remote).await?;
        let url = format!("ws://{}{}", remote.host(), self.shared.endpoint);
        let (ws, _response) = tokio_tungstenite::client_async(url, stream).await?;
        Ok(ws)
    }

    /// Stops the receive loop. Returns `false` if the client was already
    /// stopped.
    ///
    /// The loop closes the socket and both channels on its way out.
    pub fn stop(&self) -> bool {
        let stopped = self.shared.mark_stopped();
        if stopped {
            tracing::debug!(client = %self, "stop requested");
        }
        stopped
    }

    /// Writes an arbitrary request on the socket. The response, if any,
    /// arrives on the results or errors channel like any other frame.
    pub async fn send_request(&self, request: &RequestEnvelope) -> Result<(), TransportError> {
        let json = serde_json::to_string(request).map_err(ProtocolError::Encode)?;
        tracing::debug!(client = %self, request = %request, "sending request");
        self.shared.write(Message::Text(json.into())).await
    }

    /// Subscribes to events of `topic`.
    pub async fn subscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.send_request(&RequestEnvelope::subscribe(topic)).await
    }

    /// Cancels a subscription to `topic`.
    pub async fn unsubscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.send_request(&RequestEnvelope::unsubscribe(topic)).await
    }
}

impl fmt::Display for WsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.shared, f)
    }
}

impl fmt::Debug for WsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsClient")
            .field("remote", &self.shared.remote)
            .field("endpoint", &self.shared.endpoint)
            .field("state", &self.state())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Receive loop
// ---------------------------------------------------------------------------

async fn receive_loop(
    shared: Arc<Shared>,
    mut stream: SplitStream<WsStream>,
    results: mpsc::Sender<RawResult>,
    errors: mpsc::Sender<ProtocolError>,
) {
    let mut state_rx = shared.state.subscribe();

    let reason = loop {
        let frame = tokio::select! {
            frame = stream.next() => frame,
            _ = state_rx.wait_for(|state| *state == ClientState::Stopped) => break "stopped",
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                if !route(text.as_bytes(), &results, &errors, &mut state_rx).await {
                    break "stopped";
                }
            }
            Some(Ok(Message::Binary(data))) => {
                if !route(&data, &results, &errors, &mut state_rx).await {
                    break "stopped";
                }
            }
            Some(Ok(Message::Ping(_))) => tracing::trace!(client = %shared, "ping"),
            Some(Ok(Message::Pong(_))) => tracing::trace!(client = %shared, "pong"),
            Some(Ok(Message::Close(frame))) => {
                tracing::debug!(client = %shared, ?frame, "close frame received");
                break "closed by peer";
            }
            Some(Ok(Message::Frame(_))) => {}
            Some(Err(e)) => {
                tracing::warn!(client = %shared, error = %e, "websocket read failed");
                break "read failed";
            }
            None => break "stream ended",
        }
    };

    shared.mark_stopped();
    // Receivers must not wait on the close handshake.
    drop(results);
    drop(errors);
    close_sink(&shared).await;
    tracing::info!(client = %shared, reason, "websocket receive loop exited");
}

/// Routes one data frame. Returns `false` if the client was stopped while
/// waiting for room in the results channel.
async fn route(
    data: &[u8],
    results: &mpsc::Sender<RawResult>,
    errors: &mpsc::Sender<ProtocolError>,
    state_rx: &mut watch::Receiver<ClientState>,
) -> bool {
    let outcome = JsonCodec
        .decode::<ResponseEnvelope>(data)
        .and_then(ResponseEnvelope::into_raw_result);

    let raw = match outcome {
        Ok(raw) => raw,
        Err(err) => {
            report(errors, err);
            return true;
        }
    };

    tokio::select! {
        sent = results.send(raw) => {
            if sent.is_err() {
                tracing::debug!("results receiver dropped; discarding result");
            }
            true
        }
        _ = state_rx.wait_for(|state| *state == ClientState::Stopped) => false,
    }
}

fn report(errors: &mpsc::Sender<ProtocolError>, err: ProtocolError) {
    match errors.try_send(err) {
        Ok(()) => {}
        Err(TrySendError::Full(err)) => {
            tracing::warn!(error = %err, "errors channel full; dropping error");
        }
        Err(TrySendError::Closed(err)) => {
            tracing::debug!(error = %err, "errors receiver dropped; discarding error");
        }
    }
}

async fn close_sink(shared: &Shared) {
    let Some(mut sink) = shared.sink.lock().await.take() else {
        return;
    };
    let deadline: Duration = shared.config.write_timeout;
    match tokio::time::timeout(deadline, sink.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!(client = %shared, error = %e, "close failed"),
        Err(_) => tracing::debug!(client = %shared, "close timed out"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_is_created() {
        let client = WsClient::new("127.0.0.1:46657", "/websocket").unwrap();
        assert_eq!(client.state(), ClientState::Created);
        assert!(!client.is_running());
        assert_eq!(client.to_string(), "127.0.0.1:46657, /websocket");
    }

    #[test]
    fn test_stop_is_idempotent() {
        let client = WsClient::new("unix:///tmp/node.sock", "/websocket").unwrap();
        assert!(client.stop());
        assert!(!client.stop());
        assert_eq!(client.state(), ClientState::Stopped);
    }

    #[tokio::test]
    async fn test_start_after_stop_is_rejected() {
        let client = WsClient::new("127.0.0.1:1", "/websocket").unwrap();
        client.stop();
        assert!(matches!(
            client.start().await,
            Err(TransportError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn test_send_before_start_is_not_connected() {
        let client = WsClient::new("127.0.0.1:1", "/websocket").unwrap();
        assert!(matches!(
            client.subscribe("NewBlock").await,
            Err(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_failed_dial_leaves_client_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sock");
        let client = WsClient::new(&format!("unix://{}", path.display()), "/websocket").unwrap();

        assert!(matches!(
            client.start().await,
            Err(TransportError::Dial { .. })
        ));
        assert_eq!(client.state(), ClientState::Stopped);
    }

    #[tokio::test]
    async fn test_error_reports_drop_when_full() {
        let (tx, mut rx) = mpsc::channel(1);
        report(&tx, ProtocolError::Rpc("first".to_owned()));
        report(&tx, ProtocolError::Rpc("second".to_owned()));
        drop(tx);

        let kept = rx.recv().await.unwrap();
        assert_eq!(kept.rpc_message(), Some("first"));
        assert!(rx.recv().await.is_none());
    }
}
