//! Codec trait and the JSON implementation used for envelopes.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! Envelopes are plain serde types, so the codec only needs serde bounds;
//! the typed result inside an envelope is handled separately by the wire
//! decoder (see [`materialize_result`](crate::materialize_result)).

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode envelopes to bytes and decode bytes back.
///
/// - `Send + Sync` → the codec can be shared by the WebSocket receive loop
///   and callers on other threads.
/// - `'static` → it can live inside spawned tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the only format the node
/// speaks.
///
/// ## Example
///
/// ```rust
/// use chainrpc_protocol::{Codec, JsonCodec, RequestEnvelope};
/// use serde_json::json;
///
/// let codec = JsonCodec;
/// let request = RequestEnvelope::new("", "status", vec![json!(1)]);
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded: RequestEnvelope = codec.decode(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
