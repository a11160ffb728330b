//! Unified error type for chainrpc.

use chainrpc_protocol::ProtocolError;
use chainrpc_transport::TransportError;
use chainrpc_wire::{DecodeError, EncodeError, RegistryError};

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `chainrpc` crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attributes let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Dial, write, read, timeout, or handshake failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed envelope or an error returned by the node.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A result that does not fit the requested type.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A value that cannot be written in the wire format.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Conflicting interface registrations.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl RpcError {
    /// Returns the node's error message if the call reached the node and
    /// the node refused it.
    pub fn rpc_message(&self) -> Option<&str> {
        match self {
            Self::Protocol(err) | Self::Transport(TransportError::Protocol(err)) => {
                err.rpc_message()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let rpc_err: RpcError = err.into();
        assert!(matches!(rpc_err, RpcError::Transport(_)));
        assert!(rpc_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::Rpc("bad height".into());
        let rpc_err: RpcError = err.into();
        assert!(matches!(rpc_err, RpcError::Protocol(_)));
        assert_eq!(rpc_err.rpc_message(), Some("bad height"));
    }

    #[test]
    fn test_rpc_message_through_transport() {
        let err = TransportError::Protocol(ProtocolError::Rpc("busy".into()));
        let rpc_err: RpcError = err.into();
        assert_eq!(rpc_err.rpc_message(), Some("busy"));
    }

    #[test]
    fn test_from_decode_error() {
        let rpc_err: RpcError = DecodeError::UnsafeFloatDisabled.into();
        assert!(matches!(rpc_err, RpcError::Decode(_)));
        assert!(rpc_err.rpc_message().is_none());
    }

    #[test]
    fn test_from_registry_error() {
        let err = RegistryError::DuplicateTag {
            interface: "Result",
            tag: 1,
        };
        let rpc_err: RpcError = err.into();
        assert!(matches!(rpc_err, RpcError::Registry(_)));
    }
}
