//! JSON-RPC protocol for chainrpc.
//!
//! This crate defines the frames exchanged with the node and the path from
//! those frames to typed results:
//!
//! - **Types** ([`RequestEnvelope`], [`ResponseEnvelope`], [`RawResult`]):
//!   the envelopes that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): envelopes to and from bytes.
//! - **Materialization** ([`unmarshal_envelope`], [`materialize_result`]):
//!   the deferred `result` into a typed value via the wire decoder.
//! - **Result interface** ([`result::RpcResult`]): the polymorphic result
//!   type that concrete results are registered behind.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between the transports (bytes on a socket) and
//! the caller (typed values). It knows nothing about connections.
//!
//! ```text
//! Transport (bytes) → Protocol (ResponseEnvelope) → Wire decoder (T)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod materialize;
pub mod result;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use materialize::{materialize_result, unmarshal_envelope, unmarshal_response};
pub use result::{AnyResult, RpcResult};
pub use types::{
    JSONRPC_VERSION, RawResult, RequestEnvelope, ResponseEnvelope, SUBSCRIBE_METHOD,
    UNSUBSCRIBE_METHOD,
};
