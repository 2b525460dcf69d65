//! Notification feed.
//!
//! Same lifecycle and reconnect schedule as [`A2uiClient`], without
//! keep-alive and without request correlation: responses that show up on
//! the feed are discarded.

use a2ui_core::{InboundKind, RequestEnvelope};
use a2ui_settings::ClientSettings;
use serde_json::Value;
use tokio::sync::watch;

use crate::client::A2uiClient;
use crate::config::ChannelConfig;
use crate::error::Result;
use crate::state::{ConnectionState, ConnectionStatus};
use crate::transport::{Connector, WsConnector};

/// Handle to the notification feed.
#[derive(Clone, Debug)]
pub struct FeedClient {
    inner: A2uiClient,
}

impl FeedClient {
    /// Feed over WebSockets.
    pub fn new(settings: &ClientSettings, token: impl Into<String>) -> Result<Self> {
        Self::with_connector(settings, token, WsConnector)
    }

    /// Feed over a custom transport.
    pub fn with_connector(
        settings: &ClientSettings,
        token: impl Into<String>,
        connector: impl Connector,
    ) -> Result<Self> {
        Ok(Self {
            inner: A2uiClient::with_connector(ChannelConfig::feed(settings, token), connector)?,
        })
    }

    /// Open the feed socket.
    pub async fn connect(&self) -> Result<()> {
        self.inner.connect().await
    }

    /// Close the feed and suppress automatic reconnection.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    /// Handle every inbound `method`.
    pub fn on<F>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(&Value) + Send + 'static,
    {
        self.inner.on(method, handler);
    }

    /// Handle every inbound push of `kind`.
    pub fn on_kind<F>(&self, kind: &InboundKind, handler: F)
    where
        F: Fn(&Value) + Send + 'static,
    {
        self.inner.on_kind(kind, handler);
    }

    /// Observe every inbound push.
    pub fn on_message<F>(&self, observer: F)
    where
        F: Fn(&RequestEnvelope) + Send + 'static,
    {
        self.inner.on_message(observer);
    }

    /// Latest status snapshot.
    pub fn status(&self) -> ConnectionStatus {
        self.inner.status()
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.subscribe()
    }
}
