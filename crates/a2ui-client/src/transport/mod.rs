//! Socket seam.
//!
//! The driver never touches a concrete socket. A [`Connector`] opens a
//! [`Channel`]: a text-frame sink paired with a text-frame stream. The end
//! of the stream is the close event.
//!
//! - [`WsConnector`]: `tokio-tungstenite` client
//! - [`MemoryConnector`]: in-process pairs for tests and embedding

mod memory;
mod ws;

use std::pin::Pin;

use a2ui_core::constants::TOKEN_QUERY_PARAM;
use async_trait::async_trait;
use futures::{Sink, Stream};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::{ClientError, TransportError};

pub use memory::{MemoryAcceptor, MemoryConnector, MemoryPeer};
pub use ws::WsConnector;

/// Outbound half of an open socket.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;
/// Inbound half of an open socket. `None` means the socket closed.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Unreserved characters stay literal; everything else is escaped.
const TOKEN_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An open socket.
pub struct Channel {
    pub(crate) sink: FrameSink,
    pub(crate) stream: FrameStream,
}

impl Channel {
    /// Pair a sink and a stream into a channel.
    pub fn new<Si, St>(sink: Si, stream: St) -> Self
    where
        Si: Sink<String, Error = TransportError> + Send + 'static,
        St: Stream<Item = Result<String, TransportError>> + Send + 'static,
    {
        Self {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").finish_non_exhaustive()
    }
}

/// Opens sockets to a connection target.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a socket to `target`. Resolves once the socket is open.
    async fn connect(&self, target: &str) -> Result<Channel, TransportError>;
}

/// Build the connection target for `path` under `endpoint`.
///
/// `https` maps to `wss` and `http` maps to `ws`; `ws`/`wss` pass through.
/// The token is appended as the `token` query parameter.
pub fn connection_target(endpoint: &str, path: &str, token: &str) -> Result<String, ClientError> {
    let invalid = |reason: &str| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let (scheme, rest) = endpoint
        .trim()
        .split_once("://")
        .ok_or_else(|| invalid("missing scheme"))?;
    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        _ => return Err(invalid("scheme must be http, https, ws or wss")),
    };
    let authority = rest.trim_end_matches('/');
    if authority.is_empty() {
        return Err(invalid("missing host"));
    }

    let path = path.trim();
    let slash = if path.starts_with('/') || path.is_empty() {
        ""
    } else {
        "/"
    };
    let sep = if path.contains('?') { '&' } else { '?' };
    let token = utf8_percent_encode(token, TOKEN_ESCAPE);
    Ok(format!(
        "{scheme}://{authority}{slash}{path}{sep}{TOKEN_QUERY_PARAM}={token}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn https_becomes_wss() {
        assert_eq!(
            connection_target("https://agents.example.com", "/ws/a2ui", "abc").unwrap(),
            "wss://agents.example.com/ws/a2ui?token=abc"
        );
    }

    #[test]
    fn http_becomes_ws() {
        assert_eq!(
            connection_target("http://localhost:8080/", "/ws/feed", "t").unwrap(),
            "ws://localhost:8080/ws/feed?token=t"
        );
    }

    #[test]
    fn ws_schemes_pass_through() {
        assert_eq!(
            connection_target("WSS://host", "rt", "t").unwrap(),
            "wss://host/rt?token=t"
        );
    }

    #[test]
    fn token_is_escaped() {
        assert_eq!(
            connection_target("http://h", "/ws", "a b&c=d/é~x").unwrap(),
            "ws://h/ws?token=a%20b%26c%3Dd%2F%C3%A9~x"
        );
    }

    #[test]
    fn existing_query_is_extended() {
        assert_eq!(
            connection_target("http://h", "/ws?v=2", "t").unwrap(),
            "ws://h/ws?v=2&token=t"
        );
    }

    #[test]
    fn endpoint_path_prefix_is_kept() {
        assert_eq!(
            connection_target("https://h/api", "/ws/a2ui", "t").unwrap(),
            "wss://h/api/ws/a2ui?token=t"
        );
    }

    #[test]
    fn bad_endpoints_are_rejected() {
        assert_matches!(
            connection_target("localhost:8080", "/ws", "t"),
            Err(ClientError::InvalidEndpoint { .. })
        );
        assert_matches!(
            connection_target("ftp://h", "/ws", "t"),
            Err(ClientError::InvalidEndpoint { reason, .. }) if reason.contains("scheme")
        );
        assert_matches!(
            connection_target("http://", "/ws", "t"),
            Err(ClientError::InvalidEndpoint { .. })
        );
    }
}
