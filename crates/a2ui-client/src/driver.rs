//! Channel driver task.
//!
//! One task per channel owns the socket, backoff counter, pending table,
//! dispatch table and timers. Handles talk to it only through [`Command`]s,
//! so every mutation happens on this task and inbound callbacks run
//! synchronously on the receive path.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use a2ui_core::codec;
use a2ui_core::constants::METHOD_PING;
use a2ui_core::{Envelope, IdGenerator, ReconnectBackoff, RequestEnvelope, RequestId};
use futures::future::BoxFuture;
use futures::{SinkExt, StreamExt};
use metrics::counter;
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Sleep};
use tracing::{debug, info, warn};

use crate::config::{ChannelConfig, ChannelKind};
use crate::correlator::{Correlator, PendingTx};
use crate::dispatch::{DispatchTable, Handler, Observer};
use crate::error::{ClientError, Result, TransportError};
use crate::heartbeat::{Heartbeat, next_beat};
use crate::metrics::{
    CONNECTIONS_OPENED_TOTAL, FRAMES_MALFORMED_TOTAL, FRAMES_RECEIVED_TOTAL, FRAMES_SENT_TOTAL,
    HEARTBEATS_SENT_TOTAL, RECONNECTS_SCHEDULED_TOTAL, RESPONSES_STALE_TOTAL, SENDS_DROPPED_TOTAL,
};
use crate::state::{ConnectionState, ConnectionStatus};
use crate::transport::{Channel, Connector};

/// Messages from handles to the driver.
pub(crate) enum Command {
    Connect(oneshot::Sender<Result<()>>),
    Disconnect,
    Send(RequestEnvelope),
    Request {
        id: RequestId,
        method: String,
        params: Option<Value>,
        reply: PendingTx,
    },
    Forget(RequestId),
    On {
        method: String,
        handler: Handler,
    },
    OnMessage(Observer),
}

type ConnectFuture = BoxFuture<'static, std::result::Result<Channel, TransportError>>;

pub(crate) struct Driver {
    kind: ChannelKind,
    config: ChannelConfig,
    target: String,
    connector: Arc<dyn Connector>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    status_tx: watch::Sender<ConnectionStatus>,
    state: ConnectionState,
    backoff: ReconnectBackoff,
    correlator: Correlator,
    dispatch: DispatchTable,
    socket: Option<Channel>,
    connecting: Option<ConnectFuture>,
    connect_waiter: Option<oneshot::Sender<Result<()>>>,
    retry: Option<Pin<Box<Sleep>>>,
    heartbeat: Option<Heartbeat>,
}

impl Driver {
    pub(crate) fn new(
        config: ChannelConfig,
        target: String,
        connector: Arc<dyn Connector>,
        ids: Arc<IdGenerator>,
        cmd_rx: mpsc::UnboundedReceiver<Command>,
        status_tx: watch::Sender<ConnectionStatus>,
    ) -> Self {
        Self {
            kind: config.kind,
            backoff: ReconnectBackoff::new(config.backoff),
            config,
            target,
            connector,
            cmd_rx,
            status_tx,
            state: ConnectionState::Disconnected,
            correlator: Correlator::new(ids),
            dispatch: DispatchTable::new(),
            socket: None,
            connecting: None,
            connect_waiter: None,
            retry: None,
            heartbeat: None,
        }
    }

    /// Run until every handle is dropped.
    pub(crate) async fn run(mut self) {
        debug!(channel = self.kind.as_str(), "channel driver started");
        loop {
            // Commands are drained before socket traffic, so a handler
            // registered before a push arrives is in effect for it.
            tokio::select! {
                biased;

                cmd = self.cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle_command(cmd).await;
                }
                result = poll_connect(&mut self.connecting) => self.on_connect_result(result),
                frame = next_frame(&mut self.socket) => self.on_frame(frame),
                () = retry_due(&mut self.retry) => self.on_retry_due(),
                () = next_beat(&mut self.heartbeat) => self.on_heartbeat().await,
            }
        }
        self.shutdown().await;
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect(reply) => self.connect(reply),
            Command::Disconnect => self.disconnect().await,
            Command::Send(envelope) => {
                let _ = self.transmit(&envelope).await;
            }
            Command::Request {
                id,
                method,
                params,
                reply,
            } => {
                if !self.correlator.insert(id.clone(), reply) {
                    return;
                }
                let envelope = RequestEnvelope::new(method, params, Some(id));
                let _ = self.transmit(&envelope).await;
            }
            Command::Forget(id) => {
                if self.correlator.forget(&id) {
                    debug!(channel = self.kind.as_str(), %id, "stopped waiting for response");
                }
            }
            Command::On { method, handler } => {
                if self.dispatch.on(method.clone(), handler) {
                    debug!(channel = self.kind.as_str(), %method, "handler replaced");
                }
            }
            Command::OnMessage(observer) => self.dispatch.on_message(observer),
        }
    }

    // ── lifecycle ──────────────────────────────────────────────────────

    fn connect(&mut self, reply: oneshot::Sender<Result<()>>) {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                let _ = reply.send(Ok(()));
            }
            ConnectionState::Disconnected | ConnectionState::Reconnecting => {
                self.retry = None;
                self.start_attempt(Some(reply));
            }
        }
    }

    fn start_attempt(&mut self, waiter: Option<oneshot::Sender<Result<()>>>) {
        let connector = Arc::clone(&self.connector);
        let target = self.target.clone();
        self.connecting = Some(Box::pin(async move { connector.connect(&target).await }));
        self.connect_waiter = waiter;
        info!(
            channel = self.kind.as_str(),
            endpoint = %self.config.endpoint,
            path = %self.config.path,
            attempt = self.backoff.attempts(),
            "connecting"
        );
        self.set_state(ConnectionState::Connecting, None);
    }

    fn on_connect_result(&mut self, result: std::result::Result<Channel, TransportError>) {
        self.connecting = None;
        match result {
            Ok(socket) => {
                self.socket = Some(socket);
                self.backoff.reset();
                self.heartbeat = self.config.heartbeat_interval.map(Heartbeat::start);
                counter!(CONNECTIONS_OPENED_TOTAL, "channel" => self.kind.as_str()).increment(1);
                info!(channel = self.kind.as_str(), "channel open");
                self.set_state(ConnectionState::Connected, None);
                if let Some(waiter) = self.connect_waiter.take() {
                    let _ = waiter.send(Ok(()));
                }
            }
            Err(err) => {
                if let Some(waiter) = self.connect_waiter.take() {
                    warn!(channel = self.kind.as_str(), error = %err, "connect failed");
                    self.set_state(ConnectionState::Disconnected, None);
                    let _ = waiter.send(Err(ClientError::ConnectFailed(err)));
                } else {
                    warn!(
                        channel = self.kind.as_str(),
                        error = %err,
                        attempt = self.backoff.attempts(),
                        "reconnect attempt failed"
                    );
                    self.schedule_reconnect();
                }
            }
        }
    }

    fn on_closed(&mut self) {
        self.socket = None;
        self.heartbeat = None;
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        match self.backoff.next_delay() {
            Some(delay) => {
                counter!(RECONNECTS_SCHEDULED_TOTAL, "channel" => self.kind.as_str()).increment(1);
                info!(
                    channel = self.kind.as_str(),
                    attempt = self.backoff.attempts(),
                    delay_ms = duration_ms(delay),
                    "reconnect scheduled"
                );
                self.retry = Some(Box::pin(time::sleep(delay)));
                self.set_state(ConnectionState::Reconnecting, Some(delay));
            }
            None => {
                warn!(
                    channel = self.kind.as_str(),
                    max_attempts = self.backoff.config().max_attempts,
                    "reconnect budget exhausted, giving up"
                );
                self.set_state(ConnectionState::Disconnected, None);
            }
        }
    }

    fn on_retry_due(&mut self) {
        self.retry = None;
        self.start_attempt(None);
    }

    async fn disconnect(&mut self) {
        self.backoff.exhaust();
        self.heartbeat = None;
        self.retry = None;
        if self.connecting.take().is_some() {
            debug!(channel = self.kind.as_str(), "abandoning connect in flight");
        }
        if let Some(waiter) = self.connect_waiter.take() {
            let _ = waiter.send(Err(ClientError::Disconnected));
        }
        if let Some(mut socket) = self.socket.take() {
            if let Err(err) = socket.sink.close().await {
                debug!(channel = self.kind.as_str(), error = %err, "close handshake failed");
            }
        }
        if self.config.reject_pending_on_disconnect {
            let rejected = self.correlator.reject_all(|| ClientError::Disconnected);
            if rejected > 0 {
                info!(channel = self.kind.as_str(), rejected, "rejected pending requests");
            }
        }
        if self.state != ConnectionState::Disconnected {
            info!(channel = self.kind.as_str(), "disconnected");
        }
        self.set_state(ConnectionState::Disconnected, None);
    }

    async fn shutdown(mut self) {
        self.heartbeat = None;
        self.retry = None;
        self.connecting = None;
        if let Some(mut socket) = self.socket.take() {
            let _ = socket.sink.close().await;
        }
        self.set_state(ConnectionState::Disconnected, None);
        debug!(
            channel = self.kind.as_str(),
            abandoned = self.correlator.len(),
            "channel driver stopped"
        );
    }

    // ── traffic ────────────────────────────────────────────────────────

    /// Write one envelope if the socket is open. Returns whether it was
    /// written.
    async fn transmit(&mut self, envelope: &RequestEnvelope) -> bool {
        let Some(socket) = self.socket.as_mut() else {
            counter!(SENDS_DROPPED_TOTAL, "channel" => self.kind.as_str()).increment(1);
            debug!(
                channel = self.kind.as_str(),
                method = %envelope.method,
                state = %self.state,
                "socket not open, dropping send"
            );
            return false;
        };

        let text = match codec::encode_request(envelope) {
            Ok(text) => text,
            Err(err) => {
                warn!(method = %envelope.method, error = %err, "failed to encode request");
                return false;
            }
        };

        match socket.sink.send(text).await {
            Ok(()) => {
                counter!(FRAMES_SENT_TOTAL, "channel" => self.kind.as_str()).increment(1);
                debug!(
                    channel = self.kind.as_str(),
                    method = %envelope.method,
                    id = envelope.id.as_ref().map(RequestId::as_str),
                    "frame sent"
                );
                true
            }
            Err(err) => {
                warn!(channel = self.kind.as_str(), error = %err, "send failed, treating socket as closed");
                self.on_closed();
                false
            }
        }
    }

    fn on_frame(&mut self, frame: Option<std::result::Result<String, TransportError>>) {
        match frame {
            Some(Ok(text)) => self.on_text(&text),
            Some(Err(err)) => {
                warn!(channel = self.kind.as_str(), error = %err, "socket error");
                self.on_closed();
            }
            None => {
                info!(channel = self.kind.as_str(), "socket closed");
                self.on_closed();
            }
        }
    }

    fn on_text(&mut self, text: &str) {
        counter!(FRAMES_RECEIVED_TOTAL, "channel" => self.kind.as_str()).increment(1);
        match codec::decode(text) {
            None => {
                counter!(FRAMES_MALFORMED_TOTAL, "channel" => self.kind.as_str()).increment(1);
            }
            Some(Envelope::Request(request)) => {
                let _ = self.dispatch.dispatch(&request);
            }
            Some(Envelope::Response(response)) => {
                let id = response.id.clone();
                if !self.correlator.complete(response) {
                    counter!(RESPONSES_STALE_TOTAL, "channel" => self.kind.as_str()).increment(1);
                    debug!(channel = self.kind.as_str(), %id, "no pending request, discarding response");
                }
            }
        }
    }

    async fn on_heartbeat(&mut self) {
        let ping = RequestEnvelope::new(METHOD_PING, Some(json!({})), Some(self.correlator.next_id()));
        if self.transmit(&ping).await {
            counter!(HEARTBEATS_SENT_TOTAL, "channel" => self.kind.as_str()).increment(1);
        }
    }

    fn set_state(&mut self, state: ConnectionState, next_retry: Option<Duration>) {
        if self.state != state {
            debug!(channel = self.kind.as_str(), from = %self.state, to = %state, "state change");
        }
        self.state = state;
        let _ = self.status_tx.send_replace(ConnectionStatus {
            state,
            reconnect_attempts: self.backoff.attempts(),
            next_retry,
        });
    }
}

async fn poll_connect(
    connecting: &mut Option<ConnectFuture>,
) -> std::result::Result<Channel, TransportError> {
    match connecting {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

async fn next_frame(
    socket: &mut Option<Channel>,
) -> Option<std::result::Result<String, TransportError>> {
    match socket {
        Some(channel) => channel.stream.next().await,
        None => std::future::pending().await,
    }
}

async fn retry_due(retry: &mut Option<Pin<Box<Sleep>>>) {
    match retry {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
