//! Remote address resolution.
//!
//! Addresses take the form `scheme://address`. The scheme picks the
//! network; without one, a colon means TCP (`127.0.0.1:46657`) and anything
//! else is a Unix socket path (`/var/run/node.sock`).

use std::fmt;
use std::str::FromStr;

use crate::TransportError;

/// The network a remote address lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Tcp,
    Unix,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Unix => f.write_str("unix"),
        }
    }
}

/// A parsed remote address: which network, and where on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr {
    network: Network,
    address: String,
}

impl RemoteAddr {
    /// Parses `tcp://host:port`, `http://host:port`, `ws://host:port`,
    /// `unix:///path`, or a bare `host:port` / `/path`.
    pub fn parse(remote: &str) -> Result<Self, TransportError> {
        let invalid = |reason| TransportError::InvalidAddress {
            addr: remote.to_owned(),
            reason,
        };

        let (network, address) = match remote.split_once("://") {
            Some((scheme, address)) => {
                let network = match scheme {
                    "tcp" | "http" | "ws" => Network::Tcp,
                    "unix" => Network::Unix,
                    _ => return Err(invalid("unsupported scheme")),
                };
                (network, address)
            }
            None if remote.contains(':') => (Network::Tcp, remote),
            None => (Network::Unix, remote),
        };

        if address.is_empty() {
            return Err(invalid("empty address"));
        }
        Ok(Self {
            network,
            address: address.to_owned(),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The address on the network: `host:port` or a socket path.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Value for the HTTP `Host` header. Socket paths become a dummy domain
    /// by turning `/` into `.`.
    pub fn host(&self) -> String {
        self.address.replace('/', ".")
    }
}

impl FromStr for RemoteAddr {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RemoteAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.network, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_selects_network() {
        let tcp = RemoteAddr::parse("tcp://127.0.0.1:46657").unwrap();
        assert_eq!(tcp.network(), Network::Tcp);
        assert_eq!(tcp.address(), "127.0.0.1:46657");

        assert_eq!(
            RemoteAddr::parse("http://localhost:80").unwrap().network(),
            Network::Tcp
        );
        assert_eq!(
            RemoteAddr::parse("ws://localhost:80").unwrap().network(),
            Network::Tcp
        );

        let unix = RemoteAddr::parse("unix:///tmp/node.sock").unwrap();
        assert_eq!(unix.network(), Network::Unix);
        assert_eq!(unix.address(), "/tmp/node.sock");
    }

    #[test]
    fn test_bare_address_guesses_network() {
        assert_eq!(
            RemoteAddr::parse("10.0.0.1:46657").unwrap().network(),
            Network::Tcp
        );
        assert_eq!(
            RemoteAddr::parse("/var/run/node.sock").unwrap().network(),
            Network::Unix
        );
    }

    #[test]
    fn test_host_replaces_slashes() {
        let unix: RemoteAddr = "unix:///var/run/node.sock".parse().unwrap();
        assert_eq!(unix.host(), ".var.run.node.sock");
        let tcp: RemoteAddr = "127.0.0.1:1".parse().unwrap();
        assert_eq!(tcp.host(), "127.0.0.1:1");
    }

    #[test]
    fn test_unknown_scheme_and_empty_address_fail() {
        assert!(matches!(
            RemoteAddr::parse("udp://1.2.3.4:5"),
            Err(TransportError::InvalidAddress { .. })
        ));
        assert!(matches!(
            RemoteAddr::parse("tcp://"),
            Err(TransportError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_display_includes_network() {
        let addr = RemoteAddr::parse("localhost:9").unwrap();
        assert_eq!(addr.to_string(), "tcp://localhost:9");
    }
}
