//! Codec error types.
//!
//! These never escape the receive path: [`crate::codec::decode`] logs and
//! discards them. They exist so the decoding steps can use `?` and so tests
//! can assert on why a frame was rejected.

use thiserror::Error;

/// Why a frame could not be turned into an [`crate::Envelope`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// Not valid JSON, or a field had the wrong type.
    #[error("invalid JSON frame: {0}")]
    Json(#[from] serde_json::Error),
    /// Top level was valid JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,
    /// `version` was missing or did not match the protocol tag.
    #[error("unsupported protocol version: {found:?}")]
    Version {
        /// The version seen on the wire, if any.
        found: Option<String>,
    },
    /// Neither `method` nor `id` was present.
    #[error("frame carries neither method nor id")]
    Unroutable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_display() {
        let err = CodecError::Version {
            found: Some("1.0".into()),
        };
        assert!(err.to_string().contains("1.0"));
    }

    #[test]
    fn json_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err: CodecError = json_err.into();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
