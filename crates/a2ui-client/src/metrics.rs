//! Metric names.
//!
//! Every counter carries a `channel` label (`rpc` or `feed`). No recorder
//! is installed here; embedding applications choose one.

/// Frames written to the socket.
pub const FRAMES_SENT_TOTAL: &str = "a2ui_frames_sent_total";
/// Text frames read from the socket.
pub const FRAMES_RECEIVED_TOTAL: &str = "a2ui_frames_received_total";
/// Inbound frames that failed to decode.
pub const FRAMES_MALFORMED_TOTAL: &str = "a2ui_frames_malformed_total";
/// Sends dropped because the socket was not open.
pub const SENDS_DROPPED_TOTAL: &str = "a2ui_sends_dropped_total";
/// Responses whose id matched nothing pending.
pub const RESPONSES_STALE_TOTAL: &str = "a2ui_responses_stale_total";
/// Sockets opened.
pub const CONNECTIONS_OPENED_TOTAL: &str = "a2ui_connections_opened_total";
/// Reconnect attempts scheduled.
pub const RECONNECTS_SCHEDULED_TOTAL: &str = "a2ui_reconnects_scheduled_total";
/// Keep-alive pings sent.
pub const HEARTBEATS_SENT_TOTAL: &str = "a2ui_heartbeats_sent_total";
