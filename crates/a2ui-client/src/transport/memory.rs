//! In-process connector.
//!
//! Each `connect` creates a fresh pair of unbounded queues and hands the
//! far end to the [`MemoryAcceptor`] as a [`MemoryPeer`]. Dropping or
//! closing the peer is seen by the client as the socket closing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::{Channel, Connector};
use crate::error::TransportError;

/// Connector whose sockets terminate in the same process.
#[derive(Clone, Debug)]
pub struct MemoryConnector {
    accept_tx: mpsc::UnboundedSender<MemoryPeer>,
    refusing: Arc<AtomicBool>,
    attempts: Arc<AtomicUsize>,
}

/// Receives the server side of every socket a [`MemoryConnector`] opens.
#[derive(Debug)]
pub struct MemoryAcceptor {
    accept_rx: mpsc::UnboundedReceiver<MemoryPeer>,
}

/// Server side of one in-memory socket.
#[derive(Debug)]
pub struct MemoryPeer {
    target: String,
    incoming: fmpsc::UnboundedReceiver<String>,
    outgoing: fmpsc::UnboundedSender<Result<String, TransportError>>,
}

impl MemoryConnector {
    /// Create a connector and the acceptor that sees its sockets.
    pub fn new() -> (Self, MemoryAcceptor) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        (
            Self {
                accept_tx,
                refusing: Arc::new(AtomicBool::new(false)),
                attempts: Arc::new(AtomicUsize::new(0)),
            },
            MemoryAcceptor { accept_rx },
        )
    }

    /// Make every subsequent attempt fail (or succeed again).
    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }

    /// Connection attempts made so far, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, target: &str) -> Result<Channel, TransportError> {
        let _ = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.refusing.load(Ordering::SeqCst) {
            return Err(TransportError::Refused(target.to_string()));
        }

        let (client_tx, server_rx) = fmpsc::unbounded::<String>();
        let (server_tx, client_rx) = fmpsc::unbounded::<Result<String, TransportError>>();
        let peer = MemoryPeer {
            target: target.to_string(),
            incoming: server_rx,
            outgoing: server_tx,
        };
        self.accept_tx
            .send(peer)
            .map_err(|_| TransportError::Refused(target.to_string()))?;

        let sink = client_tx.sink_map_err(|_| TransportError::Closed);
        Ok(Channel::new(sink, client_rx))
    }
}

impl MemoryAcceptor {
    /// Wait for the next socket. `None` once the connector is dropped.
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.accept_rx.recv().await
    }

    /// Take a socket that is already waiting, if any.
    pub fn try_accept(&mut self) -> Option<MemoryPeer> {
        self.accept_rx.try_recv().ok()
    }
}

impl MemoryPeer {
    /// Target string the client connected to.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Push a text frame to the client. Returns `false` if the client side
    /// is gone.
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.outgoing.unbounded_send(Ok(text.into())).is_ok()
    }

    /// Push a transport failure to the client.
    pub fn fail(&self, error: TransportError) -> bool {
        self.outgoing.unbounded_send(Err(error)).is_ok()
    }

    /// Next frame from the client. `None` once the client closed.
    pub async fn recv(&mut self) -> Option<String> {
        self.incoming.next().await
    }

    /// Frame already queued by the client, if any.
    pub fn try_recv(&mut self) -> Option<String> {
        self.incoming.try_next().ok().flatten()
    }

    /// Close the socket from the server side. Frames the client already
    /// queued can still be read.
    pub fn close(&self) {
        self.outgoing.close_channel();
    }
}
