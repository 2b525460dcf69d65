//! Client settings resolution.
//!
//! Protocol defaults, then the JSON file laid over them key by key, then
//! `A2UI_*` variables. The result is validated before a channel sees it. A
//! `null` in the file means "keep the default".

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::ClientSettings;

/// Settings file location: `A2UI_SETTINGS`, else `$HOME/.a2ui/settings.json`.
pub fn settings_path() -> PathBuf {
    settings_path_with(|key| std::env::var(key).ok())
}

fn settings_path_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(explicit) = lookup("A2UI_SETTINGS").filter(|v| !v.is_empty()) {
        return PathBuf::from(explicit);
    }
    // Relative to the working directory when there is no home.
    let base = lookup("HOME").map(PathBuf::from).unwrap_or_default();
    base.join(".a2ui").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ClientSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or an invalid merged
/// result is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ClientSettings> {
    load_with(path, |key| std::env::var(key).ok())
}

/// Load settings using an arbitrary variable source instead of the process
/// environment.
pub fn load_with(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<ClientSettings> {
    let defaults = serde_json::to_value(ClientSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        overlay(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ClientSettings = serde_json::from_value(merged)?;
    apply_overrides(&mut settings, lookup);
    settings.validate()?;
    Ok(settings)
}

/// Lay `file` over `base`. Objects combine per key, anything else in
/// `file` replaces, and `null` keeps `base`.
pub fn overlay(base: Value, file: Value) -> Value {
    match (base, file) {
        (Value::Object(mut base), Value::Object(file)) => {
            for (key, value) in file.into_iter().filter(|(_, v)| !v.is_null()) {
                let combined = match base.remove(&key) {
                    Some(existing) => overlay(existing, value),
                    None => value,
                };
                let _ = base.insert(key, combined);
            }
            Value::Object(base)
        }
        (_, file) => file,
    }
}

/// Apply process environment overrides.
pub fn apply_env_overrides(settings: &mut ClientSettings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

/// Apply overrides from a variable source.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    let env = Env { lookup };

    if let Some(v) = env.string("A2UI_ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = env.string("A2UI_CHANNEL_PATH") {
        settings.channel_path = v;
    }
    if let Some(v) = env.string("A2UI_FEED_PATH") {
        settings.feed_path = v;
    }
    if let Some(v) = env.u64("A2UI_HEARTBEAT_INTERVAL_MS", 1000, 600_000) {
        settings.heartbeat_interval_ms = v;
    }
    if let Some(v) = env.u32("A2UI_MAX_RECONNECTS", 0, 100) {
        settings.max_reconnect_attempts = v;
    }
    if let Some(v) = env.u64("A2UI_RECONNECT_BASE_DELAY_MS", 1, 600_000) {
        settings.reconnect_base_delay_ms = v;
    }
    if let Some(v) = env.u64("A2UI_RECONNECT_MAX_DELAY_MS", 1, 3_600_000) {
        settings.reconnect_max_delay_ms = v;
    }
    if let Some(v) = env.bool("A2UI_REJECT_PENDING_ON_DISCONNECT") {
        settings.reject_pending_on_disconnect = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Variable readers (thin wrappers) ────────────────────────────────────────

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.lookup)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u32(&self, name: &str, min: u32, max: u32) -> Option<u32> {
        let val = (self.lookup)(name)?;
        let result = parse_u32_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = (self.lookup)(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
