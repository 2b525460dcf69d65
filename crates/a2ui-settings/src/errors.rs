//! Settings errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why a [`crate::ClientSettings`] could not be produced.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not JSON.
    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The merged document does not deserialize as [`crate::ClientSettings`].
    #[error("settings do not match the client schema: {0}")]
    Schema(#[from] serde_json::Error),
    /// A value the channel cannot run with.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// JSON name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl SettingsError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_the_file() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = SettingsError::Parse {
            path: PathBuf::from("/etc/a2ui.json"),
            source,
        };
        assert!(err.to_string().starts_with("/etc/a2ui.json is not valid JSON"));
    }

    #[test]
    fn invalid_names_the_field() {
        let err = SettingsError::invalid("endpoint", "is empty");
        assert_eq!(err.to_string(), "invalid endpoint: is empty");
    }
}
