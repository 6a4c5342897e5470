//! Notification spec and its interpreter
//!
//! A [`NotificationSpec`] is one resolved configuration cycle: the channel,
//! the base configuration, and the ordered [`ConfigOp`]s recorded since the
//! last build. [`NotificationSpec::build`] replays them onto a fresh
//! [`Notification`] in insertion order. Every op carries fully resolved
//! inputs, so building is pure.

use crate::action::{DeferredAction, NotificationAction};
use crate::style::NotificationStyle;
use melon_image::{IconTable, Image};
use std::collections::BTreeMap;

/// String-keyed payload carried through post and cancel
pub type Extras = BTreeMap<String, String>;

/// Extras key for the launch target class
pub const EXTRA_CLASS: &str = "class";

/// Extras key for the launch start value
pub const EXTRA_VALUE: &str = "value";

/// Title, text and small icon
#[derive(Debug, Clone, PartialEq)]
pub struct BaseConfig {
    /// Content title
    pub title: String,
    /// Content text
    pub text: String,
    /// Resolved small icon
    pub small_icon: Image,
}

impl BaseConfig {
    /// Create base configuration
    pub fn new(title: impl Into<String>, text: impl Into<String>, small_icon: Image) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            small_icon,
        }
    }
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self::new("", "", Image::Icon(IconTable::alert()))
    }
}

/// One deferred configuration mutation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOp {
    /// Sub text line
    SetSubtext(String),
    /// Whether to show the post time
    SetTimestamp(bool),
    /// Content-click action
    SetIntent(DeferredAction),
    /// Append an action button
    AddAction(NotificationAction),
    /// Expanded style
    SetStyle(NotificationStyle),
    /// Large icon
    SetLargeIcon(Image),
    /// Dismiss when tapped
    SetAutoCancel(bool),
    /// Alert only on first post
    SetAlertOnce(bool),
}

impl ConfigOp {
    /// Apply this op to a notification under construction
    pub fn apply(self, notification: &mut Notification) {
        match self {
            Self::SetSubtext(text) => notification.subtext = Some(text),
            Self::SetTimestamp(show) => notification.show_timestamp = show,
            Self::SetIntent(action) => notification.content_intent = Some(action),
            Self::AddAction(action) => notification.actions.push(action),
            Self::SetStyle(style) => notification.style = Some(style),
            Self::SetLargeIcon(image) => notification.large_icon = Some(image),
            Self::SetAutoCancel(on) => notification.auto_cancel = on,
            Self::SetAlertOnce(on) => notification.alert_once = on,
        }
    }

    /// Short kind name for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetSubtext(_) => "subtext",
            Self::SetTimestamp(_) => "timestamp",
            Self::SetIntent(_) => "intent",
            Self::AddAction(_) => "action",
            Self::SetStyle(_) => "style",
            Self::SetLargeIcon(_) => "large_icon",
            Self::SetAutoCancel(_) => "auto_cancel",
            Self::SetAlertOnce(_) => "alert_once",
        }
    }
}

/// Finished notification artifact
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Channel the notification posts to
    pub channel_id: String,
    /// Content title
    pub title: String,
    /// Content text
    pub text: String,
    /// Small icon
    pub small_icon: Image,
    /// Sub text line
    pub subtext: Option<String>,
    /// Show post time
    pub show_timestamp: bool,
    /// Content-click action
    pub content_intent: Option<DeferredAction>,
    /// Action buttons, in order added
    pub actions: Vec<NotificationAction>,
    /// Expanded style
    pub style: Option<NotificationStyle>,
    /// Large icon
    pub large_icon: Option<Image>,
    /// Dismiss when tapped
    pub auto_cancel: bool,
    /// Alert only on first post
    pub alert_once: bool,
    /// Opaque extras payload
    pub extras: Extras,
}

impl Notification {
    fn from_base(channel_id: String, base: BaseConfig) -> Self {
        Self {
            channel_id,
            title: base.title,
            text: base.text,
            small_icon: base.small_icon,
            subtext: None,
            show_timestamp: true,
            content_intent: None,
            actions: Vec::new(),
            style: None,
            large_icon: None,
            auto_cancel: false,
            alert_once: false,
            extras: Extras::new(),
        }
    }
}

/// One resolved configuration cycle
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSpec {
    /// Target channel; never empty
    pub channel_id: String,
    /// Base configuration
    pub base: BaseConfig,
    /// Ops in replay order
    pub ops: Vec<ConfigOp>,
    /// Extras attached last
    pub extras: Extras,
}

impl NotificationSpec {
    /// Spec with a base configuration and nothing else
    pub fn new(channel_id: impl Into<String>, base: BaseConfig) -> Self {
        Self {
            channel_id: channel_id.into(),
            base,
            ops: Vec::new(),
            extras: Extras::new(),
        }
    }

    /// Append an op
    #[must_use]
    pub fn with_op(mut self, op: ConfigOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Replay base, then each op in order, then attach extras
    #[must_use]
    pub fn build(self) -> Notification {
        let mut notification = Notification::from_base(self.channel_id, self.base);
        for op in self.ops {
            op.apply(&mut notification);
        }
        notification.extras = self.extras;
        notification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec() -> NotificationSpec {
        NotificationSpec::new("Default channel", BaseConfig::new("Hi", "There", Image::Icon(IconTable::alert())))
    }

    #[test]
    fn base_only() {
        let n = spec().build();
        assert_eq!(n.title, "Hi");
        assert_eq!(n.text, "There");
        assert_eq!(n.small_icon.as_icon(), Some(IconTable::alert()));
        assert!(n.show_timestamp);
        assert!(n.actions.is_empty());
    }

    #[test]
    fn extras_attached_after_ops() {
        let mut spec = spec().with_op(ConfigOp::SetAutoCancel(true));
        spec.extras.insert(EXTRA_VALUE.into(), "7".into());
        let n = spec.build();
        assert!(n.auto_cancel);
        assert_eq!(n.extras.get(EXTRA_VALUE).map(String::as_str), Some("7"));
    }

    #[derive(Debug, Clone)]
    enum Step {
        Subtext(String),
        AutoCancel(bool),
        Style(String),
    }

    fn arb_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            "[a-z]{0,8}".prop_map(Step::Subtext),
            any::<bool>().prop_map(Step::AutoCancel),
            "[a-z]{0,8}".prop_map(Step::Style),
        ]
    }

    fn to_op(step: &Step) -> ConfigOp {
        match step {
            Step::Subtext(s) => ConfigOp::SetSubtext(s.clone()),
            Step::AutoCancel(b) => ConfigOp::SetAutoCancel(*b),
            Step::Style(line) => ConfigOp::SetStyle(NotificationStyle::Inbox {
                lines: vec![line.clone()],
                content_title: None,
                summary_text: None,
            }),
        }
    }

    proptest! {
        #[test]
        fn prop_last_write_wins_in_call_order(steps in proptest::collection::vec(arb_step(), 0..24)) {
            let spec = steps.iter().fold(spec(), |spec, step| spec.with_op(to_op(step)));
            let n = spec.build();

            let last_subtext = steps.iter().rev().find_map(|s| match s {
                Step::Subtext(t) => Some(t.clone()),
                _ => None,
            });
            let last_cancel = steps.iter().rev().find_map(|s| match s {
                Step::AutoCancel(b) => Some(*b),
                _ => None,
            });
            let last_line = steps.iter().rev().find_map(|s| match s {
                Step::Style(l) => Some(l.clone()),
                _ => None,
            });

            prop_assert_eq!(n.subtext, last_subtext);
            prop_assert_eq!(n.auto_cancel, last_cancel.unwrap_or(false));
            let line = match n.style {
                Some(NotificationStyle::Inbox { lines, .. }) => lines.first().cloned(),
                _ => None,
            };
            prop_assert_eq!(line, last_line);
        }
    }
}
