//! # a2ui-core
//!
//! Shared vocabulary for the a2ui real-time channel.
//!
//! - **Envelopes**: [`RequestEnvelope`], [`ResponseEnvelope`], and the
//!   [`Envelope`] union as they appear on the wire
//! - **Codec**: [`codec::encode_request`] and the swallow-on-failure
//!   [`codec::decode`]
//! - **Ids**: [`RequestId`] and the monotonic [`IdGenerator`]
//! - **Protocol**: outbound method names, parameter shapes, and the opaque
//!   [`Session`] handshake result
//! - **Inbound kinds**: [`InboundKind`] for server-initiated pushes
//! - **Backoff**: reconnect delay math in [`backoff`]
//! - **Logging**: [`logging::init_subscriber`]

#![deny(unsafe_code)]

pub mod backoff;
pub mod codec;
pub mod constants;
pub mod envelope;
pub mod errors;
pub mod ids;
pub mod inbound;
pub mod logging;
pub mod protocol;

pub use backoff::{BackoffConfig, ReconnectBackoff, reconnect_delay_ms};
pub use envelope::{Envelope, ErrorBody, RequestEnvelope, ResponseEnvelope};
pub use errors::CodecError;
pub use ids::{IdGenerator, RequestId};
pub use inbound::InboundKind;
pub use protocol::{ApproveParams, CancelParams, RespondParams, Session};
