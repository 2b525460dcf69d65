//! Per-channel runtime configuration.

use std::fmt;
use std::time::Duration;

use a2ui_core::BackoffConfig;
use a2ui_settings::ClientSettings;

use crate::error::Result;
use crate::transport::connection_target;

/// Which of the two channels a driver serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Request/response channel with keep-alive.
    Rpc,
    /// Notification-only feed.
    Feed,
}

impl ChannelKind {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rpc => "rpc",
            Self::Feed => "feed",
        }
    }
}

/// Everything one channel driver runs with.
#[derive(Clone)]
pub struct ChannelConfig {
    /// Which channel this is.
    pub kind: ChannelKind,
    /// Base endpoint URL.
    pub endpoint: String,
    /// Path appended to the endpoint.
    pub path: String,
    /// Authentication token, sent as a query parameter.
    pub token: String,
    /// Keep-alive period. `None` disables keep-alive.
    pub heartbeat_interval: Option<Duration>,
    /// Reconnect parameters.
    pub backoff: BackoffConfig,
    /// Fail outstanding requests on `disconnect()`.
    pub reject_pending_on_disconnect: bool,
}

impl ChannelConfig {
    /// Request/response channel from settings.
    pub fn rpc(settings: &ClientSettings, token: impl Into<String>) -> Self {
        Self {
            kind: ChannelKind::Rpc,
            endpoint: settings.endpoint.clone(),
            path: settings.channel_path.clone(),
            token: token.into(),
            heartbeat_interval: Some(settings.heartbeat_interval()),
            backoff: settings.backoff(),
            reject_pending_on_disconnect: settings.reject_pending_on_disconnect,
        }
    }

    /// Feed channel from settings. No keep-alive.
    pub fn feed(settings: &ClientSettings, token: impl Into<String>) -> Self {
        Self {
            kind: ChannelKind::Feed,
            endpoint: settings.endpoint.clone(),
            path: settings.feed_path.clone(),
            token: token.into(),
            heartbeat_interval: None,
            backoff: settings.backoff(),
            reject_pending_on_disconnect: false,
        }
    }

    /// Full connection target including the token.
    pub fn target(&self) -> Result<String> {
        connection_target(&self.endpoint, &self.path, &self.token)
    }
}

impl fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("path", &self.path)
            .field("token", &"<redacted>")
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("backoff", &self.backoff)
            .field("reject_pending_on_disconnect", &self.reject_pending_on_disconnect)
            .finish()
    }
}
