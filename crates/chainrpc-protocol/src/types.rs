//! Envelope types: the JSON-RPC frames that travel on the wire.
//!
//! ```text
//! request:  {"jsonrpc":"2.0","id":"","method":"status","params":[...]}
//! response: {"jsonrpc":"2.0","id":"","result":<any|null>,"error":""}
//! ```
//!
//! The response's `result` is kept as unparsed JSON ([`RawValue`]) until
//! the caller knows which type it wants, so the same envelope type serves
//! every method.

use std::fmt;

use chainrpc_wire::{Registry, WireDecode, WireEncode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::value::RawValue;

use crate::ProtocolError;

/// Protocol version written into every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name the node reserves for event subscriptions.
pub const SUBSCRIBE_METHOD: &str = "subscribe";

/// Method name the node reserves for cancelling a subscription.
pub const UNSUBSCRIBE_METHOD: &str = "unsubscribe";

// ---------------------------------------------------------------------------
// RequestEnvelope
// ---------------------------------------------------------------------------

/// A JSON-RPC request.
///
/// `id` is opaque: the node echoes it back, but nothing on the client side
/// matches responses to requests by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

impl RequestEnvelope {
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    /// A `subscribe` request for `topic`.
    pub fn subscribe(topic: impl Into<String>) -> Self {
        Self::new("", SUBSCRIBE_METHOD, vec![Value::String(topic.into())])
    }

    /// An `unsubscribe` request for `topic`.
    pub fn unsubscribe(topic: impl Into<String>) -> Self {
        Self::new("", UNSUBSCRIBE_METHOD, vec![Value::String(topic.into())])
    }
}

impl fmt::Display for RequestEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.method, self.id)
    }
}

// ---------------------------------------------------------------------------
// ResponseEnvelope
// ---------------------------------------------------------------------------

/// A JSON-RPC response with its result left unparsed.
///
/// An empty `error` means success, whether or not `result` is present.
/// Missing fields decode to their empty values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub result: Option<Box<RawValue>>,
    #[serde(default)]
    pub error: String,
}

impl ResponseEnvelope {
    /// A successful response carrying `result` in the wire format.
    ///
    /// # Errors
    /// Fails if `result` cannot be encoded (an unregistered interface value,
    /// or a float in a field that does not allow one).
    pub fn success<T: WireEncode + ?Sized>(
        id: impl Into<String>,
        result: &T,
        registry: &Registry,
    ) -> Result<Self, ProtocolError> {
        let value = chainrpc_wire::encode(result, registry)?;
        let raw = serde_json::value::to_raw_value(&value).map_err(ProtocolError::Encode)?;
        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id: id.into(),
            result: Some(raw),
            error: String::new(),
        })
    }

    /// A failed response. The message must be non-empty to read as an
    /// error on the other side.
    pub fn failure(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id: id.into(),
            result: None,
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }

    /// Splits off the raw result, or returns the node's error.
    pub fn into_raw_result(self) -> Result<RawResult, ProtocolError> {
        if self.is_error() {
            return Err(ProtocolError::Rpc(self.error));
        }
        Ok(RawResult(self.result))
    }
}

// ---------------------------------------------------------------------------
// RawResult
// ---------------------------------------------------------------------------

/// The unparsed `result` of a successful response.
///
/// This is what the WebSocket client hands to consumers: each consumer
/// decides which type to materialize it into.
#[derive(Debug, Clone, Default)]
pub struct RawResult(pub Option<Box<RawValue>>);

impl RawResult {
    /// Wraps an already-serialized JSON text.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        RawValue::from_string(json.to_owned())
            .map(|raw| Self(Some(raw)))
            .map_err(ProtocolError::Decode)
    }

    /// Returns `true` if the result was absent or `null`.
    pub fn is_null(&self) -> bool {
        self.0.as_deref().is_none_or(|raw| raw.get() == "null")
    }

    /// The raw JSON text, if any.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref().map(RawValue::get)
    }

    /// Parses the result into a loosely typed JSON tree. An absent result
    /// reads as `null`.
    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        match self.as_str() {
            Some(json) => serde_json::from_str(json).map_err(ProtocolError::Decode),
            None => Ok(Value::Null),
        }
    }

    /// Decodes the result into a fresh `T`.
    pub fn materialize<T: WireDecode + Default>(
        &self,
        registry: &Registry,
    ) -> Result<T, ProtocolError> {
        let mut target = T::default();
        self.materialize_into(&mut target, registry)?;
        Ok(target)
    }

    /// Decodes the result into `target`, leaving fields absent from the
    /// result untouched.
    pub fn materialize_into<T: WireDecode + ?Sized>(
        &self,
        target: &mut T,
        registry: &Registry,
    ) -> Result<(), ProtocolError> {
        let value = self.to_value()?;
        chainrpc_wire::decode_into(target, &value, registry)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_in_field_order() {
        let request = RequestEnvelope::new("", "block", vec![json!(10)]);
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"jsonrpc":"2.0","id":"","method":"block","params":[10]}"#
        );
    }

    #[test]
    fn test_subscribe_request_shape() {
        let request = RequestEnvelope::subscribe("NewBlock");
        assert_eq!(request.method, SUBSCRIBE_METHOD);
        assert_eq!(request.params, vec![json!("NewBlock")]);
        assert_eq!(request.to_string(), "[subscribe ]");
    }

    #[test]
    fn test_response_missing_fields_default() {
        let response: ResponseEnvelope = serde_json::from_str(r#"{"id":"7"}"#).unwrap();
        assert_eq!(response.id, "7");
        assert!(response.result.is_none());
        assert!(!response.is_error());
    }

    #[test]
    fn test_null_result_reads_as_null() {
        let response: ResponseEnvelope =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"","result":null,"error":""}"#)
                .unwrap();
        let raw = response.into_raw_result().unwrap();
        assert!(raw.is_null());
        assert_eq!(raw.to_value().unwrap(), Value::Null);
    }

    #[test]
    fn test_failure_turns_into_rpc_error() {
        let err = ResponseEnvelope::failure("", "height must be positive")
            .into_raw_result()
            .unwrap_err();
        assert_eq!(err.rpc_message(), Some("height must be positive"));
    }

    #[test]
    fn test_success_keeps_result_text() {
        let registry = Registry::empty();
        let response = ResponseEnvelope::success("1", &vec![1u64, 2], &registry).unwrap();
        let raw = response.into_raw_result().unwrap();
        assert_eq!(raw.as_str(), Some("[1,2]"));
        let heights: Vec<u64> = raw.materialize(&registry).unwrap();
        assert_eq!(heights, vec![1, 2]);
    }
}
