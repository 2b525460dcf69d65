//! Connection state as seen by callers.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Lifecycle of one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No socket and no reconnect scheduled.
    #[default]
    Disconnected,
    /// An attempt is in flight.
    Connecting,
    /// The socket is open.
    Connected,
    /// Waiting out a backoff delay before the next attempt.
    Reconnecting,
}

impl ConnectionState {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot published on every state change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Current state.
    pub state: ConnectionState,
    /// Reconnect attempts consumed since the last successful open.
    pub reconnect_attempts: u32,
    /// Delay of the scheduled reconnect, while `Reconnecting`.
    pub next_retry: Option<Duration>,
}
