//! Resource descriptors
//!
//! A descriptor names where an image comes from. The host passes images as
//! strings with a small prefix grammar:
//!
//! ```text
//! ""             -> empty
//! ":name"        -> symbolic platform icon
//! "url:https://" -> remote URL
//! "a/b.png"      -> file path (anything containing '/')
//! "photo.png"    -> bundled asset
//! ```

use crate::bitmap::Image;
use crate::error::{ImageError, ImageResult};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Tagged reference to an image source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceDescriptor {
    /// Platform icon by name
    SymbolicIcon(String),
    /// Path on the local filesystem
    FilePath(PathBuf),
    /// Bundled asset name
    AssetName(String),
    /// Remote URL
    RemoteUrl(String),
    /// Already decoded image
    Decoded(Image),
}

impl ResourceDescriptor {
    /// Parse the host's textual descriptor form
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(':') {
            Self::SymbolicIcon(name.trim().to_lowercase())
        } else if let Some(url) = raw.strip_prefix("url:") {
            Self::RemoteUrl(url.to_string())
        } else if raw.contains('/') {
            Self::FilePath(PathBuf::from(raw))
        } else {
            Self::AssetName(raw.to_string())
        }
    }

    /// Interpret a dynamic host value as a descriptor
    ///
    /// # Errors
    /// - `ImageError::InvalidResourceType` if the value is not a string
    pub fn from_value(label: &str, value: &Value) -> ImageResult<Self> {
        match value {
            Value::String(raw) => Ok(Self::parse(raw)),
            other => Err(ImageError::invalid_type(label, value_type_name(other))),
        }
    }

    /// The empty descriptor
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::AssetName(String::new())
    }

    /// Check if the descriptor names nothing
    ///
    /// A bare `":"` is a symbolic icon with an empty name, not an empty
    /// descriptor; it fails the icon lookup instead.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::AssetName(s) | Self::RemoteUrl(s) => s.is_empty(),
            Self::FilePath(p) => p.as_os_str().is_empty(),
            Self::SymbolicIcon(_) | Self::Decoded(_) => false,
        }
    }

    /// Canonical cache key
    ///
    /// Decoded images have no key and are never cached.
    #[must_use]
    pub fn cache_key(&self) -> Option<String> {
        match self {
            Self::SymbolicIcon(name) => Some(format!("icon:{name}")),
            Self::FilePath(path) => Some(format!("file:{}", path.display())),
            Self::AssetName(name) => Some(format!("asset:{name}")),
            Self::RemoteUrl(url) => Some(format!("url:{url}")),
            Self::Decoded(_) => None,
        }
    }

    /// Short kind name used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SymbolicIcon(_) => "icon",
            Self::FilePath(_) => "file",
            Self::AssetName(_) => "asset",
            Self::RemoteUrl(_) => "url",
            Self::Decoded(_) => "decoded",
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cache_key() {
            Some(key) => f.write_str(&key),
            None => f.write_str("decoded:<image>"),
        }
    }
}

impl Default for ResourceDescriptor {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for ResourceDescriptor {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<Image> for ResourceDescriptor {
    fn from(image: Image) -> Self {
        Self::Decoded(image)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dictionary",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_prefix_grammar() {
        assert_eq!(
            ResourceDescriptor::parse(": Alert"),
            ResourceDescriptor::SymbolicIcon("alert".into())
        );
        assert_eq!(
            ResourceDescriptor::parse("url:https://x/y.png"),
            ResourceDescriptor::RemoteUrl("https://x/y.png".into())
        );
        assert_eq!(
            ResourceDescriptor::parse("/sdcard/a.png"),
            ResourceDescriptor::FilePath("/sdcard/a.png".into())
        );
        assert_eq!(
            ResourceDescriptor::parse("photo.png"),
            ResourceDescriptor::AssetName("photo.png".into())
        );
    }

    #[test]
    fn empty_descriptor() {
        assert!(ResourceDescriptor::parse("").is_empty());
        assert!(!ResourceDescriptor::parse(":").is_empty());
        assert!(!ResourceDescriptor::parse("a.png").is_empty());
    }

    #[test]
    fn cache_keys_distinguish_kinds() {
        let asset = ResourceDescriptor::AssetName("a".into()).cache_key();
        let icon = ResourceDescriptor::SymbolicIcon("a".into()).cache_key();
        assert_ne!(asset, icon);
        assert_eq!(asset.as_deref(), Some("asset:a"));
    }

    #[test]
    fn from_value_rejects_non_strings() {
        let err = ResourceDescriptor::from_value("LargeIcon", &json!(42)).unwrap_err();
        assert!(matches!(
            err,
            ImageError::InvalidResourceType { ref label, ref actual } if label == "LargeIcon" && actual == "number"
        ));
        assert!(ResourceDescriptor::from_value("LargeIcon", &json!("a.png")).is_ok());
    }
}
