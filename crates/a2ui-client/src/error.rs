//! Client error types.

use a2ui_core::{ErrorBody, RequestId};
use serde_json::Value;
use thiserror::Error;

/// Failures of the underlying socket.
///
/// These never reach application code through the receive path; they
/// surface only as state transitions or as a failed `connect()`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// WebSocket protocol or I/O failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    /// The remote side refused the connection.
    #[error("connection refused: {0}")]
    Refused(String),
    /// The socket is closed.
    #[error("socket closed")]
    Closed,
}

/// Errors returned to callers of the client handle.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint could not be turned into a connection target.
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// The configured endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The socket failed before it opened.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] TransportError),
    /// The server answered a request with an error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// Numeric error code.
        code: i64,
        /// Human-readable message.
        message: String,
        /// Optional structured detail.
        data: Option<Value>,
    },
    /// A caller-imposed deadline elapsed before the response arrived.
    #[error("{method} ({id}) timed out after {timeout_ms}ms")]
    Timeout {
        /// Method of the request.
        method: String,
        /// Correlation id that was abandoned.
        id: RequestId,
        /// The deadline.
        timeout_ms: u64,
    },
    /// A request with this id is already waiting for its response.
    #[error("request id {0} is already pending")]
    DuplicateId(RequestId),
    /// Params could not be serialized.
    #[error("failed to encode params: {0}")]
    Encode(#[from] serde_json::Error),
    /// `disconnect()` was called while this operation was outstanding.
    #[error("channel disconnected")]
    Disconnected,
    /// The driver task is gone.
    #[error("client shut down")]
    Shutdown,
}

impl From<ErrorBody> for ClientError {
    fn from(body: ErrorBody) -> Self {
        Self::Rpc {
            code: body.code,
            message: body.message,
            data: body.data,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_carries_message() {
        let err: ClientError = ErrorBody {
            code: -32001,
            message: "task not found".into(),
            data: None,
        }
        .into();
        assert_eq!(err.to_string(), "rpc error -32001: task not found");
    }

    #[test]
    fn connect_failed_keeps_source() {
        let err = ClientError::ConnectFailed(TransportError::Refused("nobody home".into()));
        assert!(err.to_string().contains("nobody home"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn timeout_display() {
        let err = ClientError::Timeout {
            method: "a2ui.init".into(),
            id: "req_4".into(),
            timeout_ms: 500,
        };
        assert_eq!(err.to_string(), "a2ui.init (req_4) timed out after 500ms");
    }
}
