//! Error types for notification composition

use melon_dispatch::DispatchError;
use melon_image::ImageError;

/// Errors surfaced by the notification composer
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Channel id was empty after trimming
    #[error("channel id cannot be empty")]
    EmptyChannelId,

    /// Value is not a deferred-action handle minted by this composer
    #[error("expected a deferred-action handle, got {0}")]
    InvalidIntentHandle(String),

    /// Image resolution failed
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Dispatch handle could not be created
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Platform rejected an operation
    #[error("platform error: {0}")]
    Platform(String),

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(String),
}

impl NotifyError {
    /// Create platform error
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform(message.into())
    }

    /// Create config error
    pub fn config(message: impl ToString) -> Self {
        Self::Config(message.to_string())
    }
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;
