//! Melon Image Resolution
//!
//! Resolves image resource descriptors into decoded images asynchronously,
//! backed by a bounded least-recently-used cache.
//!
//! # Core Concepts
//!
//! - [`ResourceDescriptor`]: tagged reference to an image source
//! - [`ImageResolver`]: descriptor → [`PendingImage`], never blocking the caller
//! - [`ImageCache`]: shared LRU cache keyed by canonical descriptor string
//! - [`AssetLoader`]: seam for reading bundled assets
//!
//! # Example
//!
//! ```rust,ignore
//! use melon_image::{ImageResolver, ResourceDescriptor};
//!
//! # async fn example() -> Result<(), melon_image::ImageError> {
//! let resolver = ImageResolver::default();
//! let pending = resolver.resolve("LargeIcon", &ResourceDescriptor::parse(":alert"), false)?;
//! let image = pending.await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod assets;
pub mod bitmap;
pub mod cache;
pub mod descriptor;
pub mod error;
pub mod icons;
pub mod resolver;

// Re-exports for convenience
pub use assets::{AssetLoader, DirAssetLoader, NoAssets};
pub use bitmap::{Bitmap, Image};
pub use cache::{CacheStats, ImageCache, DEFAULT_CAPACITY};
pub use descriptor::ResourceDescriptor;
pub use error::{ImageError, ImageResult};
pub use icons::{IconTable, PlatformIcon};
pub use resolver::{ImageResolver, PendingImage};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
