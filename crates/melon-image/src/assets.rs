//! Asset loading
//!
//! The host bundles named assets with the application. [`AssetLoader`] is the
//! seam the resolver reads them through.

use std::fmt::Debug;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

/// Opens bundled assets by name
pub trait AssetLoader: Send + Sync + Debug {
    /// Open the named asset for reading
    ///
    /// # Errors
    /// Returns `io::ErrorKind::NotFound` when no asset has that name.
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Loads assets from a directory
#[derive(Debug, Clone)]
pub struct DirAssetLoader {
    root: PathBuf,
}

impl DirAssetLoader {
    /// Create loader rooted at directory
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for DirAssetLoader {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        let relative = Path::new(name);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("invalid asset name: {name}"),
            ));
        }
        let file = File::open(self.root.join(relative))?;
        Ok(Box::new(file))
    }
}

/// Loader with no assets
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetLoader for NoAssets {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no asset named {name}"),
        ))
    }
}
