//! Client settings.

use std::time::Duration;

use a2ui_core::backoff::{
    BackoffConfig, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RECONNECT_ATTEMPTS,
};
use a2ui_core::constants::HEARTBEAT_INTERVAL;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Everything a channel needs besides the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Base endpoint URL (`http(s)://` or `ws(s)://`).
    pub endpoint: String,
    /// Path of the request/response channel.
    pub channel_path: String,
    /// Path of the notification feed channel.
    pub feed_path: String,
    /// Keep-alive interval in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Automatic reconnect attempts before giving up.
    pub max_reconnect_attempts: u32,
    /// Delay before the first reconnect attempt in milliseconds.
    pub reconnect_base_delay_ms: u64,
    /// Cap on any reconnect delay in milliseconds.
    pub reconnect_max_delay_ms: u64,
    /// Fail every outstanding request on an explicit `disconnect()`.
    pub reject_pending_on_disconnect: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            channel_path: "/ws/a2ui".to_string(),
            feed_path: "/ws/feed".to_string(),
            heartbeat_interval_ms: u64::try_from(HEARTBEAT_INTERVAL.as_millis())
                .unwrap_or(u64::MAX),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_base_delay_ms: DEFAULT_BASE_DELAY_MS,
            reconnect_max_delay_ms: DEFAULT_MAX_DELAY_MS,
            reject_pending_on_disconnect: false,
        }
    }
}

impl ClientSettings {
    /// Keep-alive interval.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Reconnect parameters.
    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            max_attempts: self.max_reconnect_attempts,
            base_delay_ms: self.reconnect_base_delay_ms,
            max_delay_ms: self.reconnect_max_delay_ms,
        }
    }

    /// Reject combinations the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(SettingsError::invalid("endpoint", "is empty"));
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(SettingsError::invalid(
                "heartbeatIntervalMs",
                "must be positive",
            ));
        }
        if self.reconnect_base_delay_ms > self.reconnect_max_delay_ms {
            return Err(SettingsError::invalid(
                "reconnectBaseDelayMs",
                format!(
                    "{} exceeds reconnectMaxDelayMs ({})",
                    self.reconnect_base_delay_ms, self.reconnect_max_delay_ms
                ),
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
