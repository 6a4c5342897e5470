//! Error types for image resolution
//!
//! Failures that surface to the calling program (empty required resource,
//! unknown icon, unsupported value shape) are raised synchronously from
//! [`ImageResolver::resolve`](crate::ImageResolver::resolve). Decode and
//! fetch failures travel through the pending image instead.

use std::path::PathBuf;
use std::sync::Arc;

/// Errors raised while resolving a resource descriptor into an image
///
/// Cloneable so that callers waiting on the same shared decode all observe
/// the failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImageError {
    /// Required resource was empty
    #[error("'{0}' expected a valid image resource but got an empty value")]
    MissingResource(String),

    /// Symbolic icon name is not in the platform icon table
    #[error("cannot find resource icon '{0}'")]
    ResourceNotFound(String),

    /// Value cannot be interpreted as an image resource
    #[error("'{label}' expected a valid image resource but got {actual}")]
    InvalidResourceType {
        /// Caller label used in diagnostics
        label: String,
        /// Type name of the rejected value
        actual: String,
    },

    /// Reading a file or asset failed
    #[error("io error reading {path}: {source}")]
    Io {
        /// Path or asset name being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Bytes were read but could not be decoded as an image
    #[error("decode failed: {0}")]
    Decode(String),

    /// Remote fetch failed
    #[error("fetch failed for {url}: {message}")]
    Fetch {
        /// Requested URL
        url: String,
        /// Transport or status message
        message: String,
    },

    /// Decode worker could not be scheduled or did not complete
    #[error("decode worker failed: {0}")]
    WorkerFailed(String),
}

impl ImageError {
    /// Create missing resource error for caller
    pub fn missing_resource(label: impl Into<String>) -> Self {
        Self::MissingResource(label.into())
    }

    /// Create invalid resource type error
    pub fn invalid_type(label: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidResourceType {
            label: label.into(),
            actual: actual.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Create fetch error for url
    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Check whether the caller supplied a bad value, as opposed to a
    /// source that failed to load
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::MissingResource(_) | Self::ResourceNotFound(_) | Self::InvalidResourceType { .. }
        )
    }
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for image operations
pub type ImageResult<T> = Result<T, ImageError>;
