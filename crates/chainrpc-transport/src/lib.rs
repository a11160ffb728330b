//! Client transports for chainrpc.
//!
//! - [`HttpClient`] / [`UriClient`]: one request, one response, one
//!   connection.
//! - [`WsClient`]: a persistent WebSocket connection that streams
//!   subscription results into channels.
//!
//! Both dial TCP or Unix-domain sockets, picked from the remote address
//! (see [`RemoteAddr`]).
//!
//! # Feature Flags
//!
//! - `http` (default): HTTP clients via `hyper`
//! - `websocket` (default): WebSocket client via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod address;
mod config;
mod error;
#[cfg(feature = "http")]
mod http;
mod stream;
#[cfg(feature = "websocket")]
mod websocket;

pub use address::{Network, RemoteAddr};
pub use config::{HttpConfig, WsConfig};
pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::{HttpClient, UriClient, UriParam};
pub use stream::{Stream, dial};
#[cfg(feature = "websocket")]
pub use websocket::{ClientState, WsClient, WsEvents};

use chainrpc_protocol::{RequestEnvelope, ResponseEnvelope};

/// Sends one request and waits for its response.
///
/// Implemented by the HTTP client. The WebSocket client does not implement
/// it: responses on a socket are not matched to requests.
pub trait Caller: Send + Sync {
    /// Sends `request` and returns the parsed response envelope, whether it
    /// carries a result or an error.
    async fn call_envelope(
        &self,
        request: &RequestEnvelope,
    ) -> Result<ResponseEnvelope, TransportError>;
}
