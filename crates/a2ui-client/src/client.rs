//! Request/response channel handle.

use std::sync::Arc;
use std::time::Duration;

use a2ui_core::{IdGenerator, InboundKind, RequestEnvelope, RequestId};
use a2ui_settings::ClientSettings;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time;

use crate::config::ChannelConfig;
use crate::correlator::Outcome;
use crate::driver::{Command, Driver};
use crate::error::{ClientError, Result};
use crate::state::{ConnectionState, ConnectionStatus};
use crate::transport::{Connector, WsConnector};

/// Handle to one durable channel.
///
/// Cheap to clone; all clones drive the same socket. The channel's driver
/// task stops once the last clone is dropped, failing every outstanding
/// request with [`ClientError::Shutdown`].
///
/// Constructors spawn onto the current Tokio runtime.
#[derive(Clone)]
pub struct A2uiClient {
    cmd_tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<ConnectionStatus>,
    ids: Arc<IdGenerator>,
}

impl A2uiClient {
    /// Request/response channel over WebSockets.
    pub fn new(settings: &ClientSettings, token: impl Into<String>) -> Result<Self> {
        Self::with_config(ChannelConfig::rpc(settings, token))
    }

    /// Channel over WebSockets with explicit configuration.
    pub fn with_config(config: ChannelConfig) -> Result<Self> {
        Self::with_connector(config, WsConnector)
    }

    /// Channel over a custom transport.
    pub fn with_connector(config: ChannelConfig, connector: impl Connector) -> Result<Self> {
        let target = config.target()?;
        let ids = Arc::new(IdGenerator::new());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::default());

        let driver = Driver::new(
            config,
            target,
            Arc::new(connector),
            Arc::clone(&ids),
            cmd_rx,
            status_tx,
        );
        let _ = tokio::spawn(driver.run());

        Ok(Self {
            cmd_tx,
            status_rx,
            ids,
        })
    }

    /// Open the socket.
    ///
    /// Resolves once the socket is open, or immediately if it already is or
    /// an attempt is in flight. A failed explicit attempt does not schedule
    /// a reconnect.
    pub async fn connect(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.command(Command::Connect(tx))?;
        rx.await.map_err(|_| ClientError::Shutdown)?
    }

    /// Close the socket and suppress automatic reconnection.
    ///
    /// Pending requests stay pending unless the channel was configured to
    /// reject them.
    pub fn disconnect(&self) {
        let _ = self.command(Command::Disconnect);
    }

    /// Fire-and-forget send. Returns the id stamped on the envelope.
    ///
    /// Dropped without error if the socket is not open when the driver gets
    /// to it.
    pub fn send(
        &self,
        method: impl Into<String>,
        params: Option<Value>,
        id: Option<RequestId>,
    ) -> RequestId {
        let id = id.unwrap_or_else(|| self.ids.next_id());
        let envelope = RequestEnvelope::new(method, params, Some(id.clone()));
        let _ = self.command(Command::Send(envelope));
        id
    }

    /// Send and wait for the correlated response, however long it takes.
    pub async fn request(&self, method: impl Into<String>, params: Option<Value>) -> Result<Value> {
        let (_, rx) = self.start_request(method.into(), params)?;
        rx.await.map_err(|_| ClientError::Shutdown)?
    }

    /// Send and wait at most `timeout` for the correlated response.
    ///
    /// On timeout the id is forgotten, so a late response is discarded.
    pub async fn request_with_timeout(
        &self,
        method: impl Into<String>,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        let method = method.into();
        let (id, rx) = self.start_request(method.clone(), params)?;
        if let Ok(outcome) = time::timeout(timeout, rx).await {
            return outcome.map_err(|_| ClientError::Shutdown)?;
        }
        let _ = self.command(Command::Forget(id.clone()));
        Err(ClientError::Timeout {
            method,
            id,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Handle every inbound `method`. Replaces any earlier handler for it.
    pub fn on<F>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(&Value) + Send + 'static,
    {
        let _ = self.command(Command::On {
            method: method.into(),
            handler: Box::new(handler),
        });
    }

    /// Handle every inbound push of `kind`.
    pub fn on_kind<F>(&self, kind: &InboundKind, handler: F)
    where
        F: Fn(&Value) + Send + 'static,
    {
        self.on(kind.method(), handler);
    }

    /// Observe every inbound push, after its specific handler.
    pub fn on_message<F>(&self, observer: F)
    where
        F: Fn(&RequestEnvelope) + Send + 'static,
    {
        let _ = self.command(Command::OnMessage(Box::new(observer)));
    }

    /// Latest status snapshot.
    pub fn status(&self) -> ConnectionStatus {
        self.status_rx.borrow().clone()
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.status_rx.borrow().state
    }

    /// Receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    fn start_request(
        &self,
        method: String,
        params: Option<Value>,
    ) -> Result<(RequestId, oneshot::Receiver<Outcome>)> {
        let id = self.ids.next_id();
        let (reply, rx) = oneshot::channel();
        self.command(Command::Request {
            id: id.clone(),
            method,
            params,
            reply,
        })?;
        Ok((id, rx))
    }

    fn command(&self, cmd: Command) -> Result<()> {
        self.cmd_tx.send(cmd).map_err(|_| ClientError::Shutdown)
    }
}

impl std::fmt::Debug for A2uiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2uiClient")
            .field("status", &*self.status_rx.borrow())
            .field("ids_issued", &self.ids.issued())
            .finish_non_exhaustive()
    }
}
