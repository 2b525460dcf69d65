//! Typed wrappers for the application methods.

use a2ui_core::constants::{
    METHOD_INIT, METHOD_USER_APPROVE, METHOD_USER_CANCEL, METHOD_USER_RESPOND,
};
use a2ui_core::{ApproveParams, CancelParams, RequestId, RespondParams, Session};
use serde::Serialize;
use serde_json::Value;

use crate::client::A2uiClient;
use crate::error::Result;

impl A2uiClient {
    /// Perform the `a2ui.init` handshake and return the server's session.
    pub async fn send_init(&self, params: Value) -> Result<Session> {
        self.request(METHOD_INIT, Some(params)).await.map(Session::new)
    }

    /// Answer an input request (`user.respond`).
    pub fn send_response(&self, request_id: impl Into<String>, value: Value) -> Result<RequestId> {
        self.send_typed(
            METHOD_USER_RESPOND,
            &RespondParams {
                request_id: request_id.into(),
                value,
            },
        )
    }

    /// Approve or reject a confirmation request (`user.approve`).
    pub fn send_approval(
        &self,
        request_id: impl Into<String>,
        approved: bool,
        reason: Option<String>,
    ) -> Result<RequestId> {
        self.send_typed(
            METHOD_USER_APPROVE,
            &ApproveParams {
                request_id: request_id.into(),
                approved,
                reason,
            },
        )
    }

    /// Ask the server to abort a task (`user.cancel`). Best effort.
    pub fn send_cancel(&self, task_id: impl Into<String>) -> Result<RequestId> {
        self.send_typed(
            METHOD_USER_CANCEL,
            &CancelParams {
                task_id: task_id.into(),
            },
        )
    }

    fn send_typed<P: Serialize>(&self, method: &str, params: &P) -> Result<RequestId> {
        let params = serde_json::to_value(params)?;
        Ok(self.send(method, Some(params), None))
    }
}
