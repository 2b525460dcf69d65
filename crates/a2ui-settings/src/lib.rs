//! # a2ui-settings
//!
//! Configuration for the a2ui channel client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ClientSettings::default()`]
//! 2. **User file**: `A2UI_SETTINGS` or `~/.a2ui/settings.json`, laid over the
//!    defaults key by key
//! 3. **Environment variables**: `A2UI_*` overrides (highest priority)
//!
//! The authentication token is not a setting. The embedding application
//! passes it to the client constructor.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, overlay, settings_path};
pub use types::ClientSettings;
