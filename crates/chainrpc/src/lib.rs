//! # chainrpc
//!
//! Client-side JSON-RPC for blockchain nodes.
//!
//! A node answers every call with a JSON envelope whose `result` may hold
//! polymorphic values written as `[tag, payload]`. chainrpc decodes those
//! into typed Rust values, using a registry that maps tag bytes to concrete
//! types. Calls go over HTTP (one connection per call); event subscriptions
//! stream over a WebSocket.
//!
//! ```text
//! ChainClient ──► HttpClient / UriClient ──► node        (request, response)
//!      │
//!      └────────► WsClient ──► receive loop ──► results / errors channels
//!
//! response bytes ──► ResponseEnvelope ──► RawResult ──► WireDecode + Registry ──► T
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chainrpc::prelude::*;
//!
//! wire_struct! {
//!     #[derive(Debug, Default)]
//!     pub struct ResultStatus {
//!         pub latest_block_height: u64 => "latest_block_height",
//!     }
//! }
//!
//! # async fn run() -> Result<(), RpcError> {
//! let registry = Registry::builder()
//!     .register(InterfaceDef::<Box<dyn RpcResult>>::new().variant(0x10, boxed::<ResultStatus>))?
//!     .build();
//!
//! let client = ChainClient::builder("tcp://127.0.0.1:26657")
//!     .registry(Arc::new(registry))
//!     .build()?;
//! let status: ResultStatus = client.call("status", vec![]).await?;
//!
//! let ws = client.websocket("/websocket");
//! let mut events = ws.start().await?;
//! ws.subscribe("NewBlock").await?;
//! while let Some(raw) = events.results.recv().await {
//!     let event: AnyResult = raw.materialize(client.registry())?;
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod logging;

pub use client::{
    ChainClient, ChainClientBuilder, DEFAULT_WS_ENDPOINT, call_into_with, call_with,
};
pub use error::RpcError;

// Re-export sub-crates for advanced users.
pub use chainrpc_protocol as protocol;
pub use chainrpc_transport as transport;
pub use chainrpc_wire as wire;

/// Convenience re-exports for common usage.
///
/// ```rust
/// use chainrpc::prelude::*;
/// ```
pub mod prelude {
    pub use crate::logging::{LogFormat, init_logging};
    pub use crate::{ChainClient, ChainClientBuilder, RpcError};
    pub use chainrpc_protocol::result::boxed;
    pub use chainrpc_protocol::{AnyResult, RawResult, RequestEnvelope, ResponseEnvelope, RpcResult};
    pub use chainrpc_transport::{
        Caller, ClientState, HttpConfig, UriParam, WsClient, WsConfig, WsEvents,
    };
    pub use chainrpc_wire::{
        ByteArray, Bytes, InterfaceDef, Poly, Registry, WireDecode, WireEncode, wire_struct,
    };
}
