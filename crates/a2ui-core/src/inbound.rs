//! Server-initiated push kinds.
//!
//! The set of push methods is open: servers may add methods without a
//! client release. Known methods get a variant, everything else lands in
//! [`InboundKind::Other`] and can still be routed by its raw name.

use std::fmt;

/// Known inbound push methods.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InboundKind {
    /// Full surface render (`a2ui.render`).
    Render,
    /// Incremental update to a rendered surface (`a2ui.update`).
    Update,
    /// Agent asks the user for input (`a2ui.requestInput`).
    InputRequest,
    /// Agent asks the user to confirm an action (`a2ui.requestConfirm`).
    ConfirmRequest,
    /// Progress report for a running task (`a2ui.progress`).
    Progress,
    /// Navigation instruction (`a2ui.navigate`).
    Navigate,
    /// User-facing notification (`a2ui.notify`).
    Notify,
    /// Any method without a dedicated variant.
    Other(String),
}

impl InboundKind {
    /// Every known variant, excluding `Other`.
    pub const KNOWN: [InboundKind; 7] = [
        Self::Render,
        Self::Update,
        Self::InputRequest,
        Self::ConfirmRequest,
        Self::Progress,
        Self::Navigate,
        Self::Notify,
    ];

    /// Classify a wire method name.
    pub fn from_method(method: &str) -> Self {
        match method {
            "a2ui.render" => Self::Render,
            "a2ui.update" => Self::Update,
            "a2ui.requestInput" => Self::InputRequest,
            "a2ui.requestConfirm" => Self::ConfirmRequest,
            "a2ui.progress" => Self::Progress,
            "a2ui.navigate" => Self::Navigate,
            "a2ui.notify" => Self::Notify,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The wire method name.
    pub fn method(&self) -> &str {
        match self {
            Self::Render => "a2ui.render",
            Self::Update => "a2ui.update",
            Self::InputRequest => "a2ui.requestInput",
            Self::ConfirmRequest => "a2ui.requestConfirm",
            Self::Progress => "a2ui.progress",
            Self::Navigate => "a2ui.navigate",
            Self::Notify => "a2ui.notify",
            Self::Other(m) => m,
        }
    }
}

impl fmt::Display for InboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

impl From<&str> for InboundKind {
    fn from(method: &str) -> Self {
        Self::from_method(method)
    }
}
