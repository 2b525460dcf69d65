//! Wire envelopes.
//!
//! ```text
//! Request:  { "version": "2.0", "method": <string>, "params"?: <object>, "id"?: <string> }
//! Response: { "version": "2.0", "result"?: <any>, "error"?: {code, message, data?}, "id": <string> }
//! ```
//!
//! The two shapes are told apart by field presence: anything with a
//! `method` is a request, anything else with an `id` is a response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::PROTOCOL_VERSION;
use crate::ids::RequestId;

/// A request, either sent by the client or pushed by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Protocol tag, always [`PROTOCOL_VERSION`].
    pub version: String,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl RequestEnvelope {
    /// Build a request stamped with the protocol version.
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Option<RequestId>) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_owned(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Params, or `Value::Null` when absent.
    pub fn params_or_null(&self) -> &Value {
        self.params.as_ref().unwrap_or(&Value::Null)
    }
}

/// Error object carried by a failed response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A response correlated to a prior request by `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Protocol tag, always [`PROTOCOL_VERSION`].
    pub version: String,
    /// Success payload. Absent and `null` are both treated as success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure payload. Takes precedence over `result` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    /// Correlation id of the originating request.
    pub id: RequestId,
}

impl ResponseEnvelope {
    /// Successful response.
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_owned(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Failed response.
    pub fn failure(id: RequestId, code: i64, message: impl Into<String>) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_owned(),
            result: None,
            error: Some(ErrorBody {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    /// Split into the outcome the correlator hands to the waiter.
    pub fn into_outcome(self) -> Result<Value, ErrorBody> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// One discrete message unit on the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
    /// Method-bearing message.
    Request(RequestEnvelope),
    /// Id-bearing response.
    Response(ResponseEnvelope),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_omits_absent_fields() {
        let req = RequestEnvelope::new("ping", None, None);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, json!({"version": "2.0", "method": "ping"}));
    }

    #[test]
    fn error_wins_over_result() {
        let resp = ResponseEnvelope {
            version: PROTOCOL_VERSION.into(),
            result: Some(json!(1)),
            error: Some(ErrorBody {
                code: -32000,
                message: "nope".into(),
                data: None,
            }),
            id: "req_1".into(),
        };
        let err = resp.into_outcome().unwrap_err();
        assert_eq!(err.message, "nope");
    }

    #[test]
    fn missing_result_resolves_null() {
        let resp: ResponseEnvelope =
            serde_json::from_value(json!({"version": "2.0", "id": "req_3"})).unwrap();
        assert_eq!(resp.into_outcome().unwrap(), Value::Null);
    }

    #[test]
    fn params_or_null_defaults() {
        let req = RequestEnvelope::new("x", None, None);
        assert!(req.params_or_null().is_null());
    }
}
