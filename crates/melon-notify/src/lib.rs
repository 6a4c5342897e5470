//! Melon Notification Composer
//!
//! Assembles rich notifications from deferred configuration ops and posts
//! them through a [`NotificationPlatform`].
//!
//! # Core Concepts
//!
//! - [`NotificationComposer`]: records setters, resolves images, builds and posts
//! - [`ConfigOp`]: one deferred mutation, replayed in call order
//! - [`NotificationSpec`]: one resolved cycle, built purely into a [`Notification`]
//! - [`ActionHandle`]: opaque launch or dispatch token minted by the composer
//!
//! # Example
//!
//! ```rust,ignore
//! let mut composer = NotificationComposer::from_config(config, &registry, platform);
//! composer.set_base("Hi", "There", &ResourceDescriptor::parse(":alert")).await?;
//! composer.set_large_icon(&ResourceDescriptor::parse("photo.png"))?;
//! let id = composer.post(0).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod action;
pub mod composer;
pub mod config;
pub mod error;
pub mod ids;
pub mod platform;
pub mod spec;
pub mod style;

// Re-exports for convenience
pub use action::{ActionHandle, ActionOptions, DeferredAction, NotificationAction};
pub use composer::{NotificationComposer, NotificationInfo, Triggered};
pub use config::MelonConfig;
pub use error::{NotifyError, NotifyResult};
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use platform::{Channel, Importance, InMemoryPlatform, NotificationPlatform, PostedNotification};
pub use spec::{BaseConfig, ConfigOp, Extras, Notification, NotificationSpec, EXTRA_CLASS, EXTRA_VALUE};
pub use style::{BigPictureSource, Message, NotificationStyle, Person};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
