use std::time::Duration;

use chainrpc_protocol::ProtocolError;

/// Errors that can occur in the transport layer.
///
/// Transport errors are returned as-is; nothing here retries.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The remote address could not be parsed.
    #[error("invalid address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: &'static str },

    /// Opening the TCP or Unix-domain connection failed.
    #[error("dial {addr} failed: {source}")]
    Dial {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP exchange failed (handshake, write or read).
    #[cfg(feature = "http")]
    #[error("http: {0}")]
    Http(#[from] hyper::Error),

    /// The HTTP request could not be built.
    #[cfg(feature = "http")]
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] hyper::http::Error),

    /// The operation did not finish within its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The WebSocket handshake, a read, or a write failed.
    #[cfg(feature = "websocket")]
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A write was attempted before `start()` or after the connection ended.
    #[error("not connected")]
    NotConnected,

    /// `start()` was called on a client that already ran.
    #[error("client already started")]
    AlreadyStarted,

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The response arrived but could not be used.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
