//! Protocol constants shared by every crate in the workspace.

use std::time::Duration;

/// Protocol tag carried by every envelope on the wire.
pub const PROTOCOL_VERSION: &str = "2.0";

/// Prefix of client-generated correlation ids (`req_1`, `req_2`, ...).
pub const REQUEST_ID_PREFIX: &str = "req_";

/// Query parameter carrying the authentication token.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Interval between keep-alive requests while connected.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────────────────────────────────────
// Outbound methods
// ─────────────────────────────────────────────────────────────────────────────

/// Keep-alive request, empty params.
pub const METHOD_PING: &str = "ping";
/// Session handshake; the response result is the [`crate::Session`].
pub const METHOD_INIT: &str = "a2ui.init";
/// User answer to an input request.
pub const METHOD_USER_RESPOND: &str = "user.respond";
/// User approval or rejection of a confirmation request.
pub const METHOD_USER_APPROVE: &str = "user.approve";
/// Ask the agent side to abort a task.
pub const METHOD_USER_CANCEL: &str = "user.cancel";
