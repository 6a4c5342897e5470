//! Platform notification service
//!
//! The composer talks to the host's notification service through
//! [`NotificationPlatform`]. [`InMemoryPlatform`] is a complete in-process
//! implementation used by the CLI and tests.

use crate::error::{NotifyError, NotifyResult};
use crate::spec::Notification;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};

/// Channel importance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Importance {
    /// Never shown
    None,
    /// Shown only in the shade, below the fold
    Min,
    /// Shown everywhere, no sound
    Low,
    /// Shown everywhere, makes noise
    #[default]
    Default,
    /// Makes noise and peeks
    High,
}

/// Notification channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id
    pub id: String,
    /// Display name
    pub name: String,
    /// Description shown in settings
    pub description: Option<String>,
    /// Importance
    pub importance: Importance,
}

impl Channel {
    /// Create channel
    pub fn new(id: impl Into<String>, name: impl Into<String>, importance: Importance) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            importance,
        }
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A notification currently shown
#[derive(Debug, Clone, PartialEq)]
pub struct PostedNotification {
    /// Notification id
    pub id: i32,
    /// Posted artifact
    pub notification: Notification,
    /// When it was (last) posted
    pub post_time: DateTime<Utc>,
}

/// Host notification service
pub trait NotificationPlatform: Send + Sync + Debug {
    /// Look up a channel
    fn channel(&self, id: &str) -> Option<Channel>;

    /// Register or update a channel
    fn create_channel(&self, channel: Channel);

    /// Show `notification` under `id`, replacing any notification with that id
    ///
    /// # Errors
    /// `NotifyError::Platform` if the service refuses the notification.
    fn notify(&self, id: i32, notification: Notification) -> NotifyResult<()>;

    /// Withdraw one notification
    fn cancel(&self, id: i32);

    /// Withdraw all notifications of this application
    fn cancel_all(&self);

    /// Notifications currently shown
    fn active_notifications(&self) -> Vec<PostedNotification>;

    /// Whether the application may post notifications
    fn permission_granted(&self) -> bool;

    /// Ask for notification permission; returns the resulting grant
    fn request_permission(&self) -> bool;
}

/// In-process notification service
#[derive(Debug)]
pub struct InMemoryPlatform {
    channels: RwLock<BTreeMap<String, Channel>>,
    posted: RwLock<BTreeMap<i32, PostedNotification>>,
    granted: AtomicBool,
    grant_on_request: bool,
}

impl InMemoryPlatform {
    /// Create platform with permission granted
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(BTreeMap::new()),
            posted: RwLock::new(BTreeMap::new()),
            granted: AtomicBool::new(true),
            grant_on_request: true,
        }
    }

    /// Platform where permission is missing and requests are refused
    #[must_use]
    pub fn denying() -> Self {
        Self {
            granted: AtomicBool::new(false),
            grant_on_request: false,
            ..Self::new()
        }
    }

    /// All registered channels
    #[must_use]
    pub fn channels(&self) -> Vec<Channel> {
        self.channels.read().values().cloned().collect()
    }

    /// Posted notification by id
    #[must_use]
    pub fn get(&self, id: i32) -> Option<PostedNotification> {
        self.posted.read().get(&id).cloned()
    }
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationPlatform for InMemoryPlatform {
    fn channel(&self, id: &str) -> Option<Channel> {
        self.channels.read().get(id).cloned()
    }

    fn create_channel(&self, channel: Channel) {
        tracing::debug!(channel = %channel.id, importance = ?channel.importance, "channel registered");
        self.channels.write().insert(channel.id.clone(), channel);
    }

    fn notify(&self, id: i32, notification: Notification) -> NotifyResult<()> {
        if !self.permission_granted() {
            return Err(NotifyError::platform("notification permission not granted"));
        }
        if !self.channels.read().contains_key(&notification.channel_id) {
            return Err(NotifyError::platform(format!(
                "no channel '{}' registered",
                notification.channel_id
            )));
        }
        let posted = PostedNotification {
            id,
            notification,
            post_time: Utc::now(),
        };
        if self.posted.write().insert(id, posted).is_some() {
            tracing::debug!(id, "notification updated");
        }
        Ok(())
    }

    fn cancel(&self, id: i32) {
        self.posted.write().remove(&id);
    }

    fn cancel_all(&self) {
        self.posted.write().clear();
    }

    fn active_notifications(&self) -> Vec<PostedNotification> {
        self.posted.read().values().cloned().collect()
    }

    fn permission_granted(&self) -> bool {
        self.granted.load(Ordering::Acquire)
    }

    fn request_permission(&self) -> bool {
        if self.grant_on_request {
            self.granted.store(true, Ordering::Release);
        }
        self.permission_granted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{BaseConfig, NotificationSpec};

    fn notification(channel: &str) -> Notification {
        NotificationSpec::new(channel, BaseConfig::default()).build()
    }

    #[test]
    fn notify_requires_channel() {
        let platform = InMemoryPlatform::new();
        assert!(platform.notify(1, notification("missing")).is_err());

        platform.create_channel(Channel::new("c", "c", Importance::Default));
        platform.notify(1, notification("c")).unwrap();
        assert_eq!(platform.active_notifications().len(), 1);
    }

    #[test]
    fn same_id_replaces() {
        let platform = InMemoryPlatform::new();
        platform.create_channel(Channel::new("c", "c", Importance::Low));
        platform.notify(5, notification("c")).unwrap();
        platform.notify(5, notification("c")).unwrap();
        assert_eq!(platform.active_notifications().len(), 1);

        platform.cancel(5);
        assert!(platform.get(5).is_none());
    }

    #[test]
    fn denied_permission() {
        let platform = InMemoryPlatform::denying();
        platform.create_channel(Channel::new("c", "c", Importance::High));
        assert!(!platform.request_permission());
        assert!(matches!(platform.notify(1, notification("c")), Err(NotifyError::Platform(_))));
    }
}
