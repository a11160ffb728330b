//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`HttpClient`](crate::HttpClient) and
/// [`UriClient`](crate::UriClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Deadline for one whole call: dial, write, and read of the body.
    pub timeout: Duration,
    /// `Content-Type` of JSON-RPC requests. The node expects `text/json`.
    pub content_type: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            content_type: "text/json".to_owned(),
        }
    }
}

/// Configuration for [`WsClient`](crate::WsClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WsConfig {
    /// Results buffered before the receive loop blocks.
    pub results_capacity: usize,
    /// Errors buffered before further errors are dropped.
    pub errors_capacity: usize,
    /// Deadline for each write: requests and the closing frame.
    pub write_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            results_capacity: 10,
            errors_capacity: 1,
            write_timeout: Duration::from_secs(10),
        }
    }
}
