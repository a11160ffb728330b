//! From response bytes to a typed result.
//!
//! ```text
//! bytes ──unmarshal_envelope──► ResponseEnvelope ──materialize_result──► &mut T
//!                                  │ error != ""
//!                                  └──────────────► ProtocolError::Rpc
//! ```

use chainrpc_wire::{Registry, WireDecode};
use serde_json::Value;

use crate::codec::{Codec, JsonCodec};
use crate::types::ResponseEnvelope;
use crate::ProtocolError;

/// Parses the outer envelope, leaving `result` unparsed.
pub fn unmarshal_envelope(bytes: &[u8]) -> Result<ResponseEnvelope, ProtocolError> {
    JsonCodec.decode(bytes)
}

/// Decodes the envelope's result into `dest` and hands `dest` back.
///
/// If the envelope carries an error, this fails with
/// [`ProtocolError::Rpc`] without looking at `result`. An absent result is
/// decoded as `null`.
pub fn materialize_result<'t, T: WireDecode + ?Sized>(
    envelope: &ResponseEnvelope,
    dest: &'t mut T,
    registry: &Registry,
) -> Result<&'t mut T, ProtocolError> {
    if envelope.is_error() {
        tracing::debug!(id = %envelope.id, error = %envelope.error, "node returned an error");
        return Err(ProtocolError::Rpc(envelope.error.clone()));
    }
    let value = match envelope.result.as_deref() {
        Some(raw) => serde_json::from_str(raw.get()).map_err(ProtocolError::Decode)?,
        None => Value::Null,
    };
    if let Err(err) = chainrpc_wire::decode_into(dest, &value, registry) {
        tracing::debug!(
            id = %envelope.id,
            target = std::any::type_name::<T>(),
            error = %err,
            "result does not fit target"
        );
        return Err(err.into());
    }
    Ok(dest)
}

/// [`unmarshal_envelope`] followed by [`materialize_result`] into a fresh
/// `T`.
pub fn unmarshal_response<T: WireDecode + Default>(
    bytes: &[u8],
    registry: &Registry,
) -> Result<T, ProtocolError> {
    let envelope = unmarshal_envelope(bytes)?;
    let mut result = T::default();
    materialize_result(&envelope, &mut result, registry)?;
    Ok(result)
}
