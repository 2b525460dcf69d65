//! # a2ui-client
//!
//! Durable channel to the agent orchestration service.
//!
//! - [`A2uiClient`]: request/response channel with keep-alive, correlated
//!   requests, and the typed application methods
//! - [`FeedClient`]: notification-only channel
//! - [`transport`]: the [`Connector`] seam, with WebSocket and in-memory
//!   implementations
//!
//! Each channel is a single driver task owning its socket, timers, pending
//! table and handlers. Sockets that close unexpectedly are reopened with
//! exponential backoff until the attempt budget runs out; an explicit
//! [`A2uiClient::disconnect`] suppresses that.
//!
//! Inbound handlers run synchronously on the driver task and must not
//! block.

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod correlator;
pub mod dispatch;
pub mod error;
pub mod feed;
pub mod heartbeat;
pub mod metrics;
pub mod state;
pub mod transport;

mod driver;
mod protocol;

pub use client::A2uiClient;
pub use config::{ChannelConfig, ChannelKind};
pub use error::{ClientError, Result, TransportError};
pub use feed::FeedClient;
pub use state::{ConnectionState, ConnectionStatus};
pub use transport::{
    Channel, Connector, MemoryAcceptor, MemoryConnector, MemoryPeer, WsConnector,
    connection_target,
};
