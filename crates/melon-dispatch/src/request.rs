//! Dispatch requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker some host revisions prefix to procedure names
pub const PROCEDURE_MARKER: char = '@';

/// How a dispatch request reaches its procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Requires an active foreground listener; dropped otherwise
    Foreground,
    /// Handled directly through the automation bridge
    #[default]
    Background,
}

impl DeliveryMode {
    /// Transit flag: `true` means always-foreground
    #[inline]
    #[must_use]
    pub fn as_flag(self) -> bool {
        matches!(self, Self::Foreground)
    }

    /// Mode from transit flag
    #[inline]
    #[must_use]
    pub fn from_flag(foreground: bool) -> Self {
        if foreground {
            Self::Foreground
        } else {
            Self::Background
        }
    }
}

/// Request that a named procedure run with given arguments on a given screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Target screen id
    pub screen: String,
    /// Procedure name
    pub procedure: String,
    /// Positional arguments
    pub arguments: Vec<Value>,
    /// Delivery mode
    pub mode: DeliveryMode,
}

impl DispatchRequest {
    /// Create a background request with no arguments
    pub fn new(screen: impl Into<String>, procedure: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
            procedure: procedure.into(),
            arguments: Vec::new(),
            mode: DeliveryMode::Background,
        }
    }

    /// With positional arguments
    #[inline]
    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// With delivery mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: DeliveryMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Canonical procedure name: at most one leading marker is removed
#[must_use]
pub fn canonical_procedure(name: &str) -> &str {
    name.strip_prefix(PROCEDURE_MARKER).unwrap_or(name)
}
