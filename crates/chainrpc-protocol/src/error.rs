//! Error types for the protocol layer.
//!
//! A `ProtocolError` means the bytes arrived but the exchange still failed:
//! the envelope was malformed, the node answered with an error string, or
//! the result did not fit the requested type. Network failures live in the
//! transport crate.

use chainrpc_wire::{DecodeError, EncodeError};

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an envelope failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes are not a well-formed envelope.
    ///
    /// Common causes: malformed JSON, a `result` that is not valid JSON, or
    /// an `id`/`error` field of the wrong type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The node answered with a non-empty `error` field.
    ///
    /// The message is passed through verbatim; the node does not send
    /// structured error codes.
    #[error("response error: {0}")]
    Rpc(String),

    /// The result did not decode into the requested type.
    #[error("result decode failed: {0}")]
    Wire(#[from] DecodeError),

    /// A value could not be written in the wire format.
    #[error("result encode failed: {0}")]
    WireEncode(#[from] EncodeError),
}

impl ProtocolError {
    /// Returns the node's error message, if this is an RPC-level failure.
    pub fn rpc_message(&self) -> Option<&str> {
        match self {
            Self::Rpc(message) => Some(message),
            _ => None,
        }
    }
}
