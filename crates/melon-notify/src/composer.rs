//! Deferred notification composer
//!
//! Setters record one pending op each and return immediately. Images named
//! by a setter start resolving at call time; [`NotificationComposer::build`]
//! awaits them in call order, replays the resulting [`ConfigOp`]s over the
//! base configuration, and clears the pending cycle.
//!
//! # Cycle
//!
//! ```text
//! set_base / setters ──► pending ops + extras
//!                              │ post(id)
//!                              ▼
//!            build ─► NotificationSpec::build ─► platform.notify(id)
//!                              │
//!                              ▼
//!                  pending ops + extras cleared
//! ```

use crate::action::{ActionHandle, ActionOptions, DeferredAction, NotificationAction};
use crate::config::MelonConfig;
use crate::error::{NotifyError, NotifyResult};
use crate::ids::{IdSource, RandomIds};
use crate::platform::{Channel, Importance, NotificationPlatform};
use crate::spec::{BaseConfig, ConfigOp, Extras, Notification, NotificationSpec, EXTRA_CLASS, EXTRA_VALUE};
use crate::style::{BigPictureSource, Message, NotificationStyle, Person};
use chrono::{DateTime, Utc};
use melon_dispatch::{
    AutomationLink, AutomationRegistry, DeliveryMode, Delivery, DispatchError, DispatchPayload,
    DispatchRequest, HostContext, MessageBus, Transit,
};
use melon_image::{
    AssetLoader, DirAssetLoader, IconTable, Image, ImageCache, ImageError, ImageResolver, NoAssets,
    PendingImage, ResourceDescriptor,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Launch information recorded with a posted notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationInfo {
    /// When the notification was posted
    pub post_time: DateTime<Utc>,
    /// Launch target class, if a launch intent was created for it
    pub class: Option<String>,
    /// Launch start value, if a launch intent was created for it
    pub value: Option<String>,
}

/// Outcome of firing a handle
#[derive(Debug, Clone, PartialEq)]
pub enum Triggered {
    /// The host should open this target
    Launch {
        /// Fully qualified target
        target: String,
        /// Value handed to the target on start
        start_value: String,
    },
    /// Payload was delivered to the message bus
    Dispatched(Delivery),
}

#[derive(Debug)]
enum PendingOp {
    Ready(ConfigOp),
    LargeIcon(PendingImage),
    BigPicture {
        large_icon: PendingImage,
        picture: PendingImage,
        content_description: Option<String>,
        content_title: Option<String>,
        summary_text: Option<String>,
        show_when_collapsed: bool,
    },
    Action {
        icon: PendingImage,
        title: String,
        handle: ActionHandle,
        action: DeferredAction,
        options: ActionOptions,
    },
}

impl PendingOp {
    async fn resolve(self) -> NotifyResult<ConfigOp> {
        let op = match self {
            Self::Ready(op) => op,
            Self::LargeIcon(pending) => {
                let image = pending
                    .await?
                    .ok_or_else(|| ImageError::missing_resource("LargeIcon"))?;
                ConfigOp::SetLargeIcon(image)
            }
            Self::BigPicture {
                large_icon,
                picture,
                content_description,
                content_title,
                summary_text,
                show_when_collapsed,
            } => ConfigOp::SetStyle(NotificationStyle::BigPicture {
                large_icon: large_icon.await?,
                picture: picture.await?,
                content_description,
                content_title,
                summary_text,
                show_when_collapsed,
            }),
            Self::Action {
                icon,
                title,
                handle,
                action,
                options,
            } => ConfigOp::AddAction(NotificationAction {
                icon: icon.await?,
                title,
                handle,
                action,
                options,
            }),
        };
        Ok(op)
    }
}

/// Notification composer
///
/// Owns one pending configuration cycle, the handles it minted, and the
/// collaborators it posts through.
///
/// A handle stays valid until a notification it was attached to is
/// cancelled or replaced and no other shown notification or pending cycle
/// still uses it. Handles never attached live as long as the composer.
#[derive(Debug)]
pub struct NotificationComposer {
    config: MelonConfig,
    resolver: ImageResolver,
    platform: Arc<dyn NotificationPlatform>,
    bus: Arc<MessageBus>,
    ids: Arc<dyn IdSource>,
    channel_id: String,
    base: BaseConfig,
    pending: Vec<PendingOp>,
    extras: Extras,
    handles: HashMap<ActionHandle, DeferredAction>,
    cycle_handles: Vec<ActionHandle>,
    posted_handles: HashMap<i32, Vec<ActionHandle>>,
}

impl NotificationComposer {
    /// Create composer from explicit collaborators
    pub fn new(
        config: MelonConfig,
        resolver: ImageResolver,
        bus: Arc<MessageBus>,
        platform: Arc<dyn NotificationPlatform>,
    ) -> Self {
        Self {
            channel_id: config.default_channel.clone(),
            config,
            resolver,
            platform,
            bus,
            ids: Arc::new(RandomIds),
            base: BaseConfig::default(),
            pending: Vec::new(),
            extras: Extras::new(),
            handles: HashMap::new(),
            cycle_handles: Vec::new(),
            posted_handles: HashMap::new(),
        }
    }

    /// Create composer from configuration
    ///
    /// Builds the image cache, asset loader, automation link and message
    /// bus the configuration describes.
    pub fn from_config(
        config: MelonConfig,
        automation: &AutomationRegistry,
        platform: Arc<dyn NotificationPlatform>,
    ) -> Self {
        let cache = ImageCache::new(config.cache_capacity);
        cache.set_enabled(config.caching_enabled);
        let assets: Arc<dyn AssetLoader> = match &config.asset_root {
            Some(root) => Arc::new(DirAssetLoader::new(root)),
            None => Arc::new(NoAssets),
        };
        let link = AutomationLink::probe(automation, config.automation_provider.as_deref());
        let bus = MessageBus::new(
            config.relay_capacity,
            link,
            HostContext::new(config.package_name.clone()),
        );
        Self::new(config, ImageResolver::new(cache, assets), Arc::new(bus), platform)
    }

    /// Use a specific id source for generated ids
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    // ---- Channels ----

    /// Register a channel
    ///
    /// # Errors
    /// `NotifyError::EmptyChannelId` if `id` is blank.
    pub fn create_channel(
        &self,
        id: &str,
        name: &str,
        description: &str,
        importance: Importance,
    ) -> NotifyResult<()> {
        if id.trim().is_empty() {
            return Err(NotifyError::EmptyChannelId);
        }
        let mut channel = Channel::new(id, name, importance);
        if !description.is_empty() {
            channel = channel.with_description(description);
        }
        self.platform.create_channel(channel);
        Ok(())
    }

    /// Select the channel the next notification posts to
    ///
    /// # Errors
    /// `NotifyError::EmptyChannelId` if `id` is blank.
    pub fn set_channel(&mut self, id: &str) -> NotifyResult<()> {
        if id.trim().is_empty() {
            return Err(NotifyError::EmptyChannelId);
        }
        self.channel_id = id.to_string();
        Ok(())
    }

    /// Current channel id
    #[inline]
    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Current channel, registered with default importance if missing
    pub fn resolve_channel(&self) -> Channel {
        if let Some(channel) = self.platform.channel(&self.channel_id) {
            return channel;
        }
        let channel = Channel::new(&self.channel_id, &self.channel_id, Importance::Default);
        tracing::debug!(channel = %self.channel_id, "auto-creating notification channel");
        self.platform.create_channel(channel.clone());
        channel
    }

    // ---- Base configuration ----

    /// Replace the base configuration
    ///
    /// An empty icon descriptor uses the alert icon.
    ///
    /// # Errors
    /// Any image resolution error for the small icon.
    pub async fn set_base(
        &mut self,
        title: &str,
        text: &str,
        icon: &ResourceDescriptor,
    ) -> NotifyResult<()> {
        let small_icon = self
            .resolver
            .resolve("SmallIcon", icon, true)?
            .await?
            .unwrap_or(Image::Icon(IconTable::alert()));
        self.base = BaseConfig::new(title, text, small_icon);
        Ok(())
    }

    // ---- Deferred setters ----

    /// Sub text line
    pub fn set_subtext(&mut self, text: impl Into<String>) {
        self.push(ConfigOp::SetSubtext(text.into()));
    }

    /// Whether to show the post time
    pub fn set_timestamp(&mut self, show: bool) {
        self.push(ConfigOp::SetTimestamp(show));
    }

    /// Dismiss when tapped
    pub fn set_auto_cancel(&mut self, on: bool) {
        self.push(ConfigOp::SetAutoCancel(on));
    }

    /// Alert only on the first post of an id
    pub fn set_alert_once(&mut self, on: bool) {
        self.push(ConfigOp::SetAlertOnce(on));
    }

    /// Content-click action
    ///
    /// # Errors
    /// `NotifyError::InvalidIntentHandle` if this composer did not mint `handle`.
    pub fn set_intent(&mut self, handle: ActionHandle) -> NotifyResult<()> {
        let action = self.lookup(handle)?;
        self.push(ConfigOp::SetIntent(action));
        self.cycle_handles.push(handle);
        Ok(())
    }

    /// Large icon
    ///
    /// # Errors
    /// Caller errors of image resolution; decode failures surface at build.
    pub fn set_large_icon(&mut self, icon: &ResourceDescriptor) -> NotifyResult<()> {
        let pending = self.resolver.resolve("LargeIcon", icon, false)?;
        self.pending.push(PendingOp::LargeIcon(pending));
        Ok(())
    }

    /// Append an action button
    ///
    /// # Errors
    /// - `NotifyError::InvalidIntentHandle` if this composer did not mint `handle`
    /// - Caller errors of image resolution for the icon
    pub fn add_action(
        &mut self,
        icon: &ResourceDescriptor,
        title: impl Into<String>,
        handle: ActionHandle,
        options: ActionOptions,
    ) -> NotifyResult<()> {
        let action = self.lookup(handle)?;
        let icon = self.resolver.resolve("Action", icon, true)?;
        self.pending.push(PendingOp::Action {
            icon,
            title: title.into(),
            handle,
            action,
            options,
        });
        self.cycle_handles.push(handle);
        Ok(())
    }

    /// Already-resolved expanded style
    pub fn set_style(&mut self, style: NotificationStyle) {
        self.push(ConfigOp::SetStyle(style));
    }

    /// Long-text style
    pub fn set_big_text_style(
        &mut self,
        text: impl Into<String>,
        content_title: Option<String>,
        summary_text: Option<String>,
    ) {
        self.set_style(NotificationStyle::BigText {
            text: text.into(),
            content_title,
            summary_text,
        });
    }

    /// Large-picture style
    ///
    /// # Errors
    /// Caller errors of image resolution for either image.
    pub fn set_big_picture_style(&mut self, source: BigPictureSource) -> NotifyResult<()> {
        let large_icon = self
            .resolver
            .resolve("BigPictureStyle.largeIcon", &source.large_icon, true)?;
        let picture = self
            .resolver
            .resolve("BigPictureStyle.bigPicture", &source.picture, true)?;
        self.pending.push(PendingOp::BigPicture {
            large_icon,
            picture,
            content_description: source.content_description,
            content_title: source.content_title,
            summary_text: source.summary_text,
            show_when_collapsed: source.show_when_collapsed,
        });
        Ok(())
    }

    /// Line-list style
    pub fn set_inbox_style(
        &mut self,
        lines: Vec<String>,
        content_title: Option<String>,
        summary_text: Option<String>,
    ) {
        self.set_style(NotificationStyle::Inbox {
            lines,
            content_title,
            summary_text,
        });
    }

    /// Conversation style
    pub fn set_messaging_style(
        &mut self,
        user: Person,
        conversation_title: Option<String>,
        messages: Vec<Message>,
    ) {
        self.set_style(NotificationStyle::Messaging {
            user,
            conversation_title,
            messages,
        });
    }

    fn push(&mut self, op: ConfigOp) {
        tracing::trace!(op = op.kind(), "config op recorded");
        self.pending.push(PendingOp::Ready(op));
    }

    /// Number of ops waiting for the next build
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Extras waiting for the next build
    #[inline]
    #[must_use]
    pub fn extras(&self) -> &Extras {
        &self.extras
    }

    // ---- Handles ----

    /// Launch handle for a screen of the host application
    ///
    /// Targets without a `.` are qualified with the package name. The
    /// target and start value are also recorded in the pending extras.
    pub fn create_intent(&mut self, target: &str, start_value: &str) -> ActionHandle {
        let target = if target.contains('.') {
            target.to_string()
        } else {
            format!("{}{target}", self.config.package_name)
        };
        self.extras.insert(EXTRA_CLASS.to_string(), target.clone());
        self.extras.insert(EXTRA_VALUE.to_string(), start_value.to_string());
        self.mint(DeferredAction::Launch {
            target,
            start_value: start_value.to_string(),
        })
    }

    /// Handle that dispatches a procedure call when fired
    ///
    /// # Errors
    /// - `DispatchError::AutomationUnavailable` for a background handle with
    ///   no automation provider
    /// - Argument encoding errors
    pub fn create_dispatch_intent(
        &mut self,
        screen: &str,
        procedure: &str,
        arguments: Vec<Value>,
        mode: DeliveryMode,
    ) -> NotifyResult<ActionHandle> {
        if mode == DeliveryMode::Background && !self.bus.automation().is_available() {
            return Err(DispatchError::AutomationUnavailable.into());
        }
        let request = DispatchRequest::new(screen, procedure)
            .with_arguments(arguments)
            .with_mode(mode);
        let payload = DispatchPayload::encode(&request, Transit::Json)?;
        Ok(self.mint(DeferredAction::Dispatch(payload)))
    }

    /// Fire a handle
    ///
    /// # Errors
    /// `NotifyError::InvalidIntentHandle` if this composer did not mint `handle`.
    pub fn trigger(&self, handle: ActionHandle) -> NotifyResult<Triggered> {
        match self.lookup(handle)? {
            DeferredAction::Launch {
                target,
                start_value,
            } => Ok(Triggered::Launch {
                target,
                start_value,
            }),
            DeferredAction::Dispatch(payload) => Ok(Triggered::Dispatched(self.bus.deliver(&payload))),
        }
    }

    fn mint(&mut self, action: DeferredAction) -> ActionHandle {
        let handle = ActionHandle::mint();
        tracing::debug!(%handle, kind = action.kind(), "deferred action created");
        self.handles.insert(handle, action);
        handle
    }

    /// Number of live handles
    #[inline]
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    fn release(&mut self, released: Vec<ActionHandle>) {
        for handle in released {
            let in_use = self.cycle_handles.contains(&handle)
                || self.posted_handles.values().any(|hs| hs.contains(&handle));
            if !in_use && self.handles.remove(&handle).is_some() {
                tracing::trace!(%handle, "handle released");
            }
        }
    }

    fn lookup(&self, handle: ActionHandle) -> NotifyResult<DeferredAction> {
        self.handles
            .get(&handle)
            .cloned()
            .ok_or_else(|| NotifyError::InvalidIntentHandle(handle.to_string()))
    }

    // ---- Build and post ----

    /// Assemble the pending cycle into a notification
    ///
    /// Pending images are awaited in call order. The pending ops and extras
    /// are cleared whether or not the build succeeds.
    ///
    /// # Errors
    /// Any image decode or fetch failure.
    pub async fn build(&mut self) -> NotifyResult<Notification> {
        self.cycle_handles.clear();
        self.assemble().await
    }

    async fn assemble(&mut self) -> NotifyResult<Notification> {
        let pending = std::mem::take(&mut self.pending);
        let extras = std::mem::take(&mut self.extras);

        let mut ops = Vec::with_capacity(pending.len());
        for op in pending {
            ops.push(op.resolve().await?);
        }

        let spec = NotificationSpec {
            channel_id: self.channel_id.clone(),
            base: self.base.clone(),
            ops,
            extras,
        };
        tracing::debug!(channel = %spec.channel_id, ops = spec.ops.len(), "building notification");
        Ok(spec.build())
    }

    /// Build and post under `id`, or a generated id when `id <= 0`
    ///
    /// Posting an id that is already shown replaces it, releasing the
    /// replaced notification's handles.
    ///
    /// # Errors
    /// Build failures, or `NotifyError::Platform` if the platform refuses.
    pub async fn post(&mut self, id: i32) -> NotifyResult<i32> {
        let attached = std::mem::take(&mut self.cycle_handles);
        let notification = self.assemble().await?;
        self.resolve_channel();
        let id = if id > 0 { id } else { self.ids.next_id() };
        self.platform.notify(id, notification)?;
        let replaced = if attached.is_empty() {
            self.posted_handles.remove(&id)
        } else {
            self.posted_handles.insert(id, attached)
        };
        self.release(replaced.unwrap_or_default());
        tracing::info!(id, channel = %self.channel_id, "notification posted");
        Ok(id)
    }

    /// Withdraw a notification and release its handles
    pub fn cancel(&mut self, id: i32) {
        self.platform.cancel(id);
        let released = self.posted_handles.remove(&id).unwrap_or_default();
        self.release(released);
    }

    /// Withdraw all notifications and release their handles
    pub fn cancel_all(&mut self) {
        self.platform.cancel_all();
        let released = std::mem::take(&mut self.posted_handles).into_values().flatten().collect();
        self.release(released);
    }

    /// Ids of the notifications currently shown
    #[must_use]
    pub fn active_notification_ids(&self) -> Vec<i32> {
        self.platform
            .active_notifications()
            .into_iter()
            .map(|posted| posted.id)
            .collect()
    }

    /// Post time and launch extras of a shown notification
    #[must_use]
    pub fn notification_info(&self, id: i32) -> Option<NotificationInfo> {
        self.platform
            .active_notifications()
            .into_iter()
            .find(|posted| posted.id == id)
            .map(|posted| NotificationInfo {
                post_time: posted.post_time,
                class: posted.notification.extras.get(EXTRA_CLASS).cloned(),
                value: posted.notification.extras.get(EXTRA_VALUE).cloned(),
            })
    }

    // ---- Host plumbing ----

    /// Whether the application may post notifications
    #[must_use]
    pub fn permission_granted(&self) -> bool {
        self.platform.permission_granted()
    }

    /// Ask for notification permission
    pub fn request_permission(&self) -> bool {
        self.platform.request_permission()
    }

    /// Register the active screen with the automation provider, best effort
    pub fn activate_automation(&self, screen: &str) {
        self.bus.automation().activate(self.bus.context(), screen);
    }

    /// Enable or disable the image cache
    pub fn set_caching(&self, enabled: bool) {
        self.resolver.cache().set_enabled(enabled);
    }

    /// Image resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    /// Message bus that fired dispatch handles are delivered to
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Configuration this composer was built from
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MelonConfig {
        &self.config
    }
}
