//! Message codec: envelopes to JSON text and back.
//!
//! Decoding is total from the caller's point of view. [`decode`] returns
//! `None` for anything it cannot route, so a single bad frame never tears
//! down the channel. [`try_decode`] exposes the reason for tests and
//! diagnostics.

use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::PROTOCOL_VERSION;
use crate::envelope::{Envelope, RequestEnvelope, ResponseEnvelope};
use crate::errors::CodecError;

/// Serialize an outgoing request to wire text.
pub fn encode_request(request: &RequestEnvelope) -> Result<String, CodecError> {
    Ok(serde_json::to_string(request)?)
}

/// Serialize a response to wire text.
///
/// The client never sends responses; this exists for servers and tests
/// speaking the same protocol.
pub fn encode_response(response: &ResponseEnvelope) -> Result<String, CodecError> {
    Ok(serde_json::to_string(response)?)
}

/// Parse wire text, swallowing every failure.
pub fn decode(text: &str) -> Option<Envelope> {
    match try_decode(text) {
        Ok(envelope) => Some(envelope),
        Err(err) => {
            debug!(error = %err, len = text.len(), "dropping malformed frame");
            None
        }
    }
}

/// Parse wire text, reporting why a frame was rejected.
pub fn try_decode(text: &str) -> Result<Envelope, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(map) = value else {
        return Err(CodecError::NotAnObject);
    };
    check_version(&map)?;

    if map.contains_key("method") {
        let request: RequestEnvelope = serde_json::from_value(Value::Object(map))?;
        Ok(Envelope::Request(request))
    } else if map.contains_key("id") {
        let response: ResponseEnvelope = serde_json::from_value(Value::Object(map))?;
        Ok(Envelope::Response(response))
    } else {
        Err(CodecError::Unroutable)
    }
}

fn check_version(map: &Map<String, Value>) -> Result<(), CodecError> {
    match map.get("version").and_then(Value::as_str) {
        Some(PROTOCOL_VERSION) => Ok(()),
        other => Err(CodecError::Version {
            found: other.map(str::to_owned),
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RequestId;
    use assert_matches::assert_matches;
    use serde_json::json;

    // -- encode --

    #[test]
    fn encoded_request_carries_version() {
        let req = RequestEnvelope::new("a2ui.init", Some(json!({})), Some("req_1".into()));
        let text = encode_request(&req).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["version"], "2.0");
        assert_eq!(v["method"], "a2ui.init");
        assert_eq!(v["id"], "req_1");
    }

    #[test]
    fn request_round_trip_preserves_fields() {
        let req = RequestEnvelope::new(
            "user.respond",
            Some(json!({"request_id": "r9", "value": [1, 2, 3]})),
            Some(RequestId::from("req_42")),
        );
        let text = encode_request(&req).unwrap();
        let Some(Envelope::Request(back)) = decode(&text) else {
            panic!("expected request");
        };
        assert_eq!(back.method, req.method);
        assert_eq!(back.params, req.params);
        assert_eq!(back.id, req.id);
    }

    // -- decode: routing --

    #[test]
    fn method_bearing_frame_is_request() {
        let env = try_decode(r#"{"version":"2.0","method":"a2ui.render","params":{"x":1}}"#).unwrap();
        assert_matches!(env, Envelope::Request(r) if r.method == "a2ui.render" && r.id.is_none());
    }

    #[test]
    fn method_with_id_is_still_request() {
        let env = try_decode(r#"{"version":"2.0","method":"a2ui.requestInput","id":"srv_1"}"#).unwrap();
        assert_matches!(env, Envelope::Request(_));
    }

    #[test]
    fn id_bearing_frame_is_response() {
        let env = try_decode(r#"{"version":"2.0","id":"req_1","result":{"sessionId":"s1"}}"#).unwrap();
        assert_matches!(env, Envelope::Response(r) if r.id.as_str() == "req_1");
    }

    #[test]
    fn error_response_decodes_body() {
        let env = try_decode(
            r#"{"version":"2.0","id":"req_2","error":{"code":-32601,"message":"no such method"}}"#,
        )
        .unwrap();
        let Envelope::Response(resp) = env else {
            panic!("expected response");
        };
        let err = resp.into_outcome().unwrap_err();
        assert_eq!(err.code, -32601);
        assert_eq!(err.message, "no such method");
    }

    // -- decode: rejection --

    #[test]
    fn truncated_json_is_swallowed() {
        assert!(decode("{not json").is_none());
        assert_matches!(try_decode("{not json"), Err(CodecError::Json(_)));
    }

    #[test]
    fn non_object_is_rejected() {
        assert_matches!(try_decode("[1,2]"), Err(CodecError::NotAnObject));
        assert_matches!(try_decode("\"hi\""), Err(CodecError::NotAnObject));
    }

    #[test]
    fn missing_version_is_rejected() {
        assert_matches!(
            try_decode(r#"{"method":"a2ui.render"}"#),
            Err(CodecError::Version { found: None })
        );
    }

    #[test]
    fn wrong_version_is_rejected() {
        assert_matches!(
            try_decode(r#"{"version":"1.0","method":"a2ui.render"}"#),
            Err(CodecError::Version { found: Some(v) }) if v == "1.0"
        );
    }

    #[test]
    fn frame_without_method_or_id_is_unroutable() {
        assert_matches!(
            try_decode(r#"{"version":"2.0","result":1}"#),
            Err(CodecError::Unroutable)
        );
    }

    #[test]
    fn wrong_field_types_are_rejected() {
        assert!(decode(r#"{"version":"2.0","method":7}"#).is_none());
        assert!(decode(r#"{"version":"2.0","id":12,"result":null}"#).is_none());
    }

    #[test]
    fn empty_and_whitespace_frames_are_swallowed() {
        assert!(decode("").is_none());
        assert!(decode("   ").is_none());
    }
}
