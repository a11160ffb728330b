//! `ChainClient` builder and typed calls.
//!
//! Ties the layers together: one remote address, one registry, and the
//! transports that talk to the node.

use std::sync::Arc;

use chainrpc_protocol::{RequestEnvelope, materialize_result};
use chainrpc_transport::{
    Caller, HttpClient, HttpConfig, RemoteAddr, UriClient, UriParam, WsClient, WsConfig,
};
use chainrpc_wire::{Registry, WireDecode};
use serde_json::Value;

use crate::RpcError;

/// Path the node serves its WebSocket endpoint on.
pub const DEFAULT_WS_ENDPOINT: &str = "/websocket";

/// Builder for a [`ChainClient`].
///
/// # Example
///
/// ```rust,no_run
/// use chainrpc::prelude::*;
///
/// # async fn run() -> Result<(), RpcError> {
/// let client = ChainClient::builder("tcp://127.0.0.1:26657").build()?;
/// let pong: String = client.call("ping", vec![]).await?;
/// # Ok(())
/// # }
/// ```
pub struct ChainClientBuilder {
    remote: String,
    registry: Option<Arc<Registry>>,
    http_config: HttpConfig,
    ws_config: WsConfig,
}

impl ChainClientBuilder {
    /// Creates a builder for `remote` with default settings and an empty
    /// registry.
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            registry: None,
            http_config: HttpConfig::default(),
            ws_config: WsConfig::default(),
        }
    }

    /// Sets the registry used to decode interface values.
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the HTTP configuration, shared by JSON and URI calls.
    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Sets the configuration of WebSocket clients made by
    /// [`ChainClient::websocket`].
    pub fn ws_config(mut self, config: WsConfig) -> Self {
        self.ws_config = config;
        self
    }

    /// Parses the remote address and builds the client. Nothing is dialed
    /// until the first call.
    pub fn build(self) -> Result<ChainClient, RpcError> {
        let remote = RemoteAddr::parse(&self.remote)?;
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(Registry::empty()));

        tracing::debug!(%remote, "chain client ready");
        Ok(ChainClient {
            http: HttpClient::from_parts(remote.clone(), self.http_config.clone()),
            uri: UriClient::from_parts(remote.clone(), self.http_config),
            remote,
            registry,
            ws_config: self.ws_config,
        })
    }
}

/// Client for one node.
///
/// Cheap to share behind an `Arc`: every HTTP call opens its own
/// connection, and WebSocket clients are created on demand.
pub struct ChainClient {
    remote: RemoteAddr,
    registry: Arc<Registry>,
    http: HttpClient,
    uri: UriClient,
    ws_config: WsConfig,
}

impl ChainClient {
    /// Creates a new builder.
    pub fn builder(remote: impl Into<String>) -> ChainClientBuilder {
        ChainClientBuilder::new(remote)
    }

    pub fn remote(&self) -> &RemoteAddr {
        &self.remote
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The JSON-over-HTTP client.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// The URI-style HTTP client.
    pub fn uri(&self) -> &UriClient {
        &self.uri
    }

    /// Calls `method` over HTTP and decodes its result into a fresh `T`.
    pub async fn call<T: WireDecode + Default>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        call_with(&self.http, &self.registry, method, params).await
    }

    /// Calls `method` over HTTP and decodes its result into `dest`.
    pub async fn call_into<T: WireDecode + ?Sized>(
        &self,
        method: &str,
        params: Vec<Value>,
        dest: &mut T,
    ) -> Result<(), RpcError> {
        call_into_with(&self.http, &self.registry, method, params, dest).await
    }

    /// Calls `method` URI-style with named parameters.
    pub async fn call_uri<T: WireDecode + Default>(
        &self,
        method: &str,
        params: &[(&str, UriParam)],
    ) -> Result<T, RpcError> {
        Ok(self.uri.call(method, params, &self.registry).await?)
    }

    /// Creates a WebSocket client for `endpoint` on the same node. Call
    /// [`WsClient::start`] to connect it.
    pub fn websocket(&self, endpoint: &str) -> WsClient {
        WsClient::from_parts(self.remote.clone(), endpoint, self.ws_config.clone())
    }
}

/// Sends `method` through any [`Caller`] and decodes the result into a fresh
/// `T`.
pub async fn call_with<C, T>(
    caller: &C,
    registry: &Registry,
    method: &str,
    params: Vec<Value>,
) -> Result<T, RpcError>
where
    C: Caller,
    T: WireDecode + Default,
{
    let mut result = T::default();
    call_into_with(caller, registry, method, params, &mut result).await?;
    Ok(result)
}

/// Like [`call_with`], decoding into an existing value.
pub async fn call_into_with<C, T>(
    caller: &C,
    registry: &Registry,
    method: &str,
    params: Vec<Value>,
    dest: &mut T,
) -> Result<(), RpcError>
where
    C: Caller,
    T: WireDecode + ?Sized,
{
    let request = RequestEnvelope::new("", method, params);
    let response = caller.call_envelope(&request).await?;
    materialize_result(&response, dest, registry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chainrpc_protocol::ResponseEnvelope;
    use chainrpc_transport::{Network, TransportError};
    use serde_json::json;

    use super::*;

    struct Fixed(ResponseEnvelope);

    impl Caller for Fixed {
        async fn call_envelope(
            &self,
            _request: &RequestEnvelope,
        ) -> Result<ResponseEnvelope, TransportError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_builder_parses_remote() {
        let client = ChainClient::builder("unix:///tmp/node.sock").build().unwrap();
        assert_eq!(client.remote().network(), Network::Unix);
        assert_eq!(client.http().remote(), client.remote());
    }

    #[test]
    fn test_builder_rejects_bad_remote() {
        let err = ChainClient::builder("udp://127.0.0.1:1").build().err().unwrap();
        assert!(matches!(err, RpcError::Transport(TransportError::InvalidAddress { .. })));
    }

    #[test]
    fn test_websocket_shares_remote() {
        let client = ChainClient::builder("127.0.0.1:26657").build().unwrap();
        let ws = client.websocket(DEFAULT_WS_ENDPOINT);
        assert_eq!(ws.to_string(), "127.0.0.1:26657, /websocket");
    }

    #[tokio::test]
    async fn test_call_with_decodes_result() {
        let registry = Registry::empty();
        let caller = Fixed(ResponseEnvelope::success("", &json!(12), &registry).unwrap());
        let height: u64 = call_with(&caller, &registry, "height", vec![]).await.unwrap();
        assert_eq!(height, 12);
    }

    #[tokio::test]
    async fn test_call_with_surfaces_node_error() {
        let caller = Fixed(ResponseEnvelope::failure("", "not found"));
        let err = call_with::<_, u64>(&caller, &Registry::empty(), "height", vec![])
            .await
            .unwrap_err();
        assert_eq!(err.rpc_message(), Some("not found"));
    }
}
