//! Deferred-action handles
//!
//! A handle is an opaque token standing for something the host does when a
//! notification (or one of its buttons) is tapped: launch a screen, or
//! dispatch a procedure call. Only the composer mints handles; values it
//! did not mint are rejected wherever a handle is required.

use melon_dispatch::DispatchPayload;
use melon_image::Image;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque deferred-action token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionHandle(u64);

impl ActionHandle {
    /// Mint a process-unique handle
    pub(crate) fn mint() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw value received from the host
    ///
    /// The result is only accepted by a composer that minted it.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw token value
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle #{}", self.0)
    }
}

/// What a handle does when fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Open a screen of the host application
    Launch {
        /// Fully qualified target
        target: String,
        /// Value handed to the target on start
        start_value: String,
    },
    /// Deliver a procedure dispatch payload
    Dispatch(DispatchPayload),
}

impl DeferredAction {
    /// Short kind name for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Launch { .. } => "launch",
            Self::Dispatch(_) => "dispatch",
        }
    }
}

/// Button flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionOptions {
    /// Action only makes sense in the notification's context
    pub contextual: bool,
    /// Requires device authentication before firing
    pub auth_required: bool,
    /// Platform may offer generated replies
    pub allow_generated_replies: bool,
    /// Firing shows a user interface
    pub shows_user_interface: bool,
}

/// Button attached to a notification
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationAction {
    /// Button icon
    pub icon: Option<Image>,
    /// Button label
    pub title: String,
    /// Handle fired by the button
    pub handle: ActionHandle,
    /// Action behind the handle
    pub action: DeferredAction,
    /// Button flags
    pub options: ActionOptions,
}
