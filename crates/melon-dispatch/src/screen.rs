//! Active-screen directory

use parking_lot::RwLock;
use std::fmt::Debug;
use std::sync::Arc;

/// Reports which screen is currently active
pub trait ScreenDirectory: Send + Sync + Debug {
    /// Id of the active screen
    fn current_screen_id(&self) -> String;
}

/// Shared, settable active screen
#[derive(Debug, Clone, Default)]
pub struct ActiveScreen {
    current: Arc<RwLock<String>>,
}

impl ActiveScreen {
    /// Create directory with initial screen
    pub fn new(screen: impl Into<String>) -> Self {
        Self {
            current: Arc::new(RwLock::new(screen.into())),
        }
    }

    /// Switch the active screen
    pub fn set(&self, screen: impl Into<String>) {
        let screen = screen.into();
        tracing::debug!(%screen, "active screen changed");
        *self.current.write() = screen;
    }
}

impl ScreenDirectory for ActiveScreen {
    fn current_screen_id(&self) -> String {
        self.current.read().clone()
    }
}
