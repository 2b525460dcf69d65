//! Parameter shapes for the outbound application methods.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque result of the `a2ui.init` handshake.
///
/// Handed back to the caller as-is; this crate never looks inside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(Value);

impl Session {
    /// Wrap a handshake result.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the raw value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume and return the raw value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

/// `user.respond` params.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RespondParams {
    /// Id of the input request being answered.
    pub request_id: String,
    /// The user's answer.
    pub value: Value,
}

/// `user.approve` params.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApproveParams {
    /// Id of the confirmation request being answered.
    pub request_id: String,
    /// Whether the user approved.
    pub approved: bool,
    /// Optional free-text reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `user.cancel` params.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CancelParams {
    /// Task the remote side should abort.
    pub task_id: String,
}
