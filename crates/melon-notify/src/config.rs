//! Composer configuration
//!
//! Loaded from TOML or built in code:
//!
//! ```toml
//! cache_capacity = 20
//! caching_enabled = true
//! default_channel = "Default channel"
//! package_name = "app."
//! automation_provider = "recording"
//! relay_capacity = 64
//! asset_root = "assets"
//! ```

use crate::error::{NotifyError, NotifyResult};
use melon_dispatch::DEFAULT_RELAY_CAPACITY;
use melon_image::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Composer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MelonConfig {
    /// Image cache capacity
    pub cache_capacity: u64,
    /// Whether the image cache starts enabled
    pub caching_enabled: bool,
    /// Channel used until `set_channel` is called
    pub default_channel: String,
    /// Prefix qualifying launch targets that contain no `.`
    pub package_name: String,
    /// Automation provider to select; `None` leaves the bridge unavailable
    pub automation_provider: Option<String>,
    /// Foreground relay buffer
    pub relay_capacity: usize,
    /// Directory backing the asset loader
    pub asset_root: Option<PathBuf>,
}

impl MelonConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With image cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With caching enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.caching_enabled = enabled;
        self
    }

    /// With default channel id
    #[must_use]
    pub fn with_default_channel(mut self, channel: impl Into<String>) -> Self {
        self.default_channel = channel.into();
        self
    }

    /// With package prefix
    #[must_use]
    pub fn with_package_name(mut self, package: impl Into<String>) -> Self {
        self.package_name = package.into();
        self
    }

    /// With automation provider name
    #[must_use]
    pub fn with_automation_provider(mut self, provider: impl Into<String>) -> Self {
        self.automation_provider = Some(provider.into());
        self
    }

    /// With asset directory
    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = Some(root.into());
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// `NotifyError::Config` on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> NotifyResult<Self> {
        toml::from_str(text).map_err(NotifyError::config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// `NotifyError::Config` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> NotifyResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| NotifyError::config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

impl Default for MelonConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CAPACITY,
            caching_enabled: true,
            default_channel: "Default channel".to_string(),
            package_name: "app.".to_string(),
            automation_provider: None,
            relay_capacity: DEFAULT_RELAY_CAPACITY,
            asset_root: None,
        }
    }
}
