//! Expanded notification styles

use melon_image::{Image, ResourceDescriptor};
use serde::{Deserialize, Serialize};

/// Participant in a messaging conversation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Person {
    /// Display name
    pub name: String,
    /// Stable key
    pub key: Option<String>,
    /// Bot account
    pub bot: bool,
    /// Marked important
    pub important: bool,
}

impl Person {
    /// Create person with display name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One message in a messaging conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message body
    pub text: String,
    /// Milliseconds since the epoch
    pub timestamp: i64,
    /// Sender; `None` means the device user
    pub sender: Option<Person>,
}

/// Expanded layout
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationStyle {
    /// Long text
    BigText {
        /// Expanded body
        text: String,
        /// Title when expanded
        content_title: Option<String>,
        /// Summary line
        summary_text: Option<String>,
    },
    /// Large picture
    BigPicture {
        /// Large icon shown when expanded
        large_icon: Option<Image>,
        /// The picture
        picture: Option<Image>,
        /// Accessibility description
        content_description: Option<String>,
        /// Title when expanded
        content_title: Option<String>,
        /// Summary line
        summary_text: Option<String>,
        /// Show picture as thumbnail when collapsed
        show_when_collapsed: bool,
    },
    /// List of lines
    Inbox {
        /// Lines, in order
        lines: Vec<String>,
        /// Title when expanded
        content_title: Option<String>,
        /// Summary line
        summary_text: Option<String>,
    },
    /// Conversation
    Messaging {
        /// Device user
        user: Person,
        /// Conversation title; group conversations only
        conversation_title: Option<String>,
        /// Messages, in order
        messages: Vec<Message>,
    },
}

impl NotificationStyle {
    /// Short kind name for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BigText { .. } => "big_text",
            Self::BigPicture { .. } => "big_picture",
            Self::Inbox { .. } => "inbox",
            Self::Messaging { .. } => "messaging",
        }
    }
}

/// Unresolved inputs of a big-picture style
///
/// Both images are optional; empty descriptors resolve to no image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BigPictureSource {
    /// Large icon shown when expanded
    pub large_icon: ResourceDescriptor,
    /// The picture
    pub picture: ResourceDescriptor,
    /// Accessibility description
    pub content_description: Option<String>,
    /// Title when expanded
    pub content_title: Option<String>,
    /// Summary line
    pub summary_text: Option<String>,
    /// Show picture as thumbnail when collapsed
    pub show_when_collapsed: bool,
}

impl BigPictureSource {
    /// Picture only
    #[must_use]
    pub fn picture(picture: ResourceDescriptor) -> Self {
        Self {
            picture,
            ..Self::default()
        }
    }
}
