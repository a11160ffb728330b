//! One-shot HTTP clients.
//!
//! Every call opens a fresh connection, sends one `POST`, reads the whole
//! body, and closes the connection. There is no pooling and no retry: a
//! failed call is reported as-is and the next call dials again.
//!
//! ```text
//! HttpClient::call ──► POST /         {"jsonrpc":"2.0","id":"","method":..,"params":[..]}
//! UriClient::call  ──► POST /<method> height=10&hash=0xAB01
//! ```

use std::time::Duration;

use chainrpc_protocol::{
    Codec, JsonCodec, RequestEnvelope, ResponseEnvelope, materialize_result, unmarshal_envelope,
};
use chainrpc_wire::{Registry, WireDecode, WireEncode};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{CONNECTION, CONTENT_TYPE, HOST};
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::address::RemoteAddr;
use crate::config::HttpConfig;
use crate::stream::dial;
use crate::{Caller, TransportError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// ---------------------------------------------------------------------------
// HttpClient
// ---------------------------------------------------------------------------

/// JSON-RPC over HTTP: params as an ordered list, posted to `/`.
///
/// Stateless; share one instance across tasks freely.
#[derive(Debug, Clone)]
pub struct HttpClient {
    remote: RemoteAddr,
    config: HttpConfig,
}

impl HttpClient {
    /// Creates a client for `remote` with the default configuration.
    pub fn new(remote: &str) -> Result<Self, TransportError> {
        Self::with_config(remote, HttpConfig::default())
    }

    pub fn with_config(remote: &str, config: HttpConfig) -> Result<Self, TransportError> {
        Ok(Self::from_parts(RemoteAddr::parse(remote)?, config))
    }

    pub fn from_parts(remote: RemoteAddr, config: HttpConfig) -> Self {
        Self { remote, config }
    }

    pub fn remote(&self) -> &RemoteAddr {
        &self.remote
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Calls `method` and decodes its result into a fresh `T`.
    ///
    /// # Errors
    /// - Transport failures and timeouts.
    /// - [`ProtocolError::Rpc`](chainrpc_protocol::ProtocolError::Rpc) if the
    ///   node answered with an error.
    /// - Decode errors if the result does not fit `T`.
    pub async fn call<T: WireDecode + Default>(
        &self,
        method: &str,
        params: Vec<Value>,
        registry: &Registry,
    ) -> Result<T, TransportError> {
        let mut result = T::default();
        self.call_into(method, params, &mut result, registry).await?;
        Ok(result)
    }

    /// Calls `method` and decodes its result into `dest`, keeping fields
    /// absent from the result untouched.
    pub async fn call_into<T: WireDecode + ?Sized>(
        &self,
        method: &str,
        params: Vec<Value>,
        dest: &mut T,
        registry: &Registry,
    ) -> Result<(), TransportError> {
        let request = RequestEnvelope::new("", method, params);
        let response = self.call_envelope(&request).await?;
        materialize_result(&response, dest, registry)?;
        Ok(())
    }

    /// Sends `request` as-is and returns the parsed envelope, error or not.
    pub async fn call_envelope(
        &self,
        request: &RequestEnvelope,
    ) -> Result<ResponseEnvelope, TransportError> {
        let body = JsonCodec.encode(request)?;
        tracing::debug!(remote = %self.remote, method = %request.method, "http call");
        let bytes = post(
            &self.remote,
            self.config.timeout,
            "/",
            &self.config.content_type,
            body,
        )
        .await?;
        Ok(unmarshal_envelope(&bytes)?)
    }
}

impl Caller for HttpClient {
    async fn call_envelope(
        &self,
        request: &RequestEnvelope,
    ) -> Result<ResponseEnvelope, TransportError> {
        HttpClient::call_envelope(self, request).await
    }
}

// ---------------------------------------------------------------------------
// UriClient
// ---------------------------------------------------------------------------

/// A parameter of a [`UriClient`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum UriParam {
    /// Sent as `0x`-prefixed upper-case hex.
    Bytes(Vec<u8>),
    /// Sent as its JSON text.
    Json(Value),
}

impl UriParam {
    /// Encodes `value` in the wire format.
    pub fn wire<T: WireEncode + ?Sized>(
        value: &T,
        registry: &Registry,
    ) -> Result<Self, TransportError> {
        let value = chainrpc_wire::encode(value, registry)
            .map_err(chainrpc_protocol::ProtocolError::from)?;
        Ok(Self::Json(value))
    }

    fn to_form_value(&self) -> String {
        match self {
            Self::Bytes(bytes) => format!("0x{}", hex::encode_upper(bytes)),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<Value> for UriParam {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for UriParam {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// RPC over HTTP with named params: form-encoded and posted to
/// `/<method>`.
#[derive(Debug, Clone)]
pub struct UriClient {
    remote: RemoteAddr,
    config: HttpConfig,
}

impl UriClient {
    pub fn new(remote: &str) -> Result<Self, TransportError> {
        Self::with_config(remote, HttpConfig::default())
    }

    pub fn with_config(remote: &str, config: HttpConfig) -> Result<Self, TransportError> {
        Ok(Self::from_parts(RemoteAddr::parse(remote)?, config))
    }

    pub fn from_parts(remote: RemoteAddr, config: HttpConfig) -> Self {
        Self { remote, config }
    }

    pub fn remote(&self) -> &RemoteAddr {
        &self.remote
    }

    /// Calls `method` with named `params` and decodes its result.
    pub async fn call<T: WireDecode + Default>(
        &self,
        method: &str,
        params: &[(&str, UriParam)],
        registry: &Registry,
    ) -> Result<T, TransportError> {
        let response = self.call_envelope(method, params).await?;
        let mut result = T::default();
        materialize_result(&response, &mut result, registry)?;
        Ok(result)
    }

    /// Calls `method` and returns the parsed envelope, error or not.
    pub async fn call_envelope(
        &self,
        method: &str,
        params: &[(&str, UriParam)],
    ) -> Result<ResponseEnvelope, TransportError> {
        let body = form_body(params);
        tracing::debug!(remote = %self.remote, method, "uri call");
        let path = format!("/{method}");
        let bytes = post(
            &self.remote,
            self.config.timeout,
            &path,
            FORM_CONTENT_TYPE,
            body.into_bytes(),
        )
        .await?;
        Ok(unmarshal_envelope(&bytes)?)
    }
}

fn form_body(params: &[(&str, UriParam)]) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());
    for (name, param) in params {
        form.append_pair(name, &param.to_form_value());
    }
    form.finish()
}

// ---------------------------------------------------------------------------
// Shared POST
// ---------------------------------------------------------------------------

/// Aborts the connection driver when the call ends, successfully or not.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Posts `body` to `path` on a fresh connection and returns the response
/// body, whatever the status code.
async fn post(
    remote: &RemoteAddr,
    timeout: Duration,
    path: &str,
    content_type: &str,
    body: Vec<u8>,
) -> Result<Vec<u8>, TransportError> {
    let exchange = async {
        let stream = dial(remote).await?;
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        let _driver = AbortOnDrop(tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "http connection ended with error");
            }
        }));

        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(HOST, remote.host())
            .header(CONTENT_TYPE, content_type)
            .header(CONNECTION, "close")
            .body(Full::new(Bytes::from(body)))?;

        let response = sender.send_request(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        tracing::trace!(%status, len = body.len(), "http response");
        Ok::<_, TransportError>(body.to_vec())
    };

    tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| TransportError::Timeout(timeout))?
}
