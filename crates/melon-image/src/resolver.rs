//! Image resolver
//!
//! Turns a [`ResourceDescriptor`] into a [`PendingImage`] without blocking the
//! caller. Icons, passthrough images and cache hits complete immediately;
//! files and assets are decoded on the blocking pool, URLs are fetched on the
//! async runtime. Successful decodes are written to the cache before the
//! pending image completes, and overlapping decodes of the same key share
//! one read.

use crate::assets::{AssetLoader, NoAssets};
use crate::bitmap::{Bitmap, Image};
use crate::cache::ImageCache;
use crate::descriptor::ResourceDescriptor;
use crate::error::{ImageError, ImageResult};
use crate::icons::IconTable;
use serde_json::Value;
use std::future::Future;
use std::io::Read;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// An image that may still be decoding
///
/// Await it at the point of consumption. Work already scheduled always runs
/// to completion; dropping the pending image does not cancel it.
#[derive(Debug)]
pub struct PendingImage(PendingState);

#[derive(Debug)]
enum PendingState {
    Ready(Option<Image>),
    Decoding(JoinHandle<ImageResult<Image>>),
}

impl PendingImage {
    /// Already-completed pending image
    #[inline]
    #[must_use]
    pub fn ready(image: Option<Image>) -> Self {
        Self(PendingState::Ready(image))
    }

    /// Check if no decode work is outstanding
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        match &self.0 {
            PendingState::Ready(_) => true,
            PendingState::Decoding(handle) => handle.is_finished(),
        }
    }
}

impl Future for PendingImage {
    type Output = ImageResult<Option<Image>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.0 {
            PendingState::Ready(image) => Poll::Ready(Ok(image.take())),
            PendingState::Decoding(handle) => Pin::new(handle).poll(cx).map(|joined| match joined {
                Ok(result) => result.map(Some),
                Err(e) => Err(ImageError::WorkerFailed(e.to_string())),
            }),
        }
    }
}

/// Resolves descriptors into images with a shared bounded cache
#[derive(Debug, Clone)]
pub struct ImageResolver {
    cache: ImageCache,
    icons: IconTable,
    assets: Arc<dyn AssetLoader>,
    http: reqwest::Client,
}

impl ImageResolver {
    /// Create resolver over a cache and asset loader
    #[must_use]
    pub fn new(cache: ImageCache, assets: Arc<dyn AssetLoader>) -> Self {
        Self {
            cache,
            icons: IconTable::platform(),
            assets,
            http: reqwest::Client::new(),
        }
    }

    /// Use a different icon table
    #[inline]
    #[must_use]
    pub fn with_icons(mut self, icons: IconTable) -> Self {
        self.icons = icons;
        self
    }

    /// Get cache reference
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Get icon table
    #[inline]
    #[must_use]
    pub fn icons(&self) -> &IconTable {
        &self.icons
    }

    /// Resolve descriptor into a pending image
    ///
    /// # Arguments
    /// * `label` - Caller name used in diagnostics
    /// * `descriptor` - Image source
    /// * `optional` - Whether an empty descriptor resolves to `None`
    ///
    /// # Errors
    /// - `ImageError::MissingResource` if the descriptor is empty and not optional
    /// - `ImageError::ResourceNotFound` if a symbolic icon is unknown
    /// - `ImageError::WorkerFailed` if decode work cannot be scheduled
    pub fn resolve(
        &self,
        label: &str,
        descriptor: &ResourceDescriptor,
        optional: bool,
    ) -> ImageResult<PendingImage> {
        if descriptor.is_empty() {
            return if optional {
                Ok(PendingImage::ready(None))
            } else {
                Err(ImageError::missing_resource(label))
            };
        }

        let key = descriptor.cache_key();
        if let Some(hit) = key.as_deref().and_then(|k| self.cache.get(k)) {
            tracing::trace!(caller = label, key = key.as_deref(), "image cache hit");
            return Ok(PendingImage::ready(Some(hit)));
        }

        match descriptor {
            ResourceDescriptor::SymbolicIcon(name) => self
                .icons
                .lookup(name)
                .map(|icon| PendingImage::ready(Some(Image::Icon(icon))))
                .ok_or_else(|| ImageError::ResourceNotFound(name.clone())),
            ResourceDescriptor::Decoded(image) => Ok(PendingImage::ready(Some(image.clone()))),
            ResourceDescriptor::FilePath(path) => {
                let path = path.clone();
                self.spawn_decode(label, key, move || read_file(path))
            }
            ResourceDescriptor::AssetName(name) => {
                let assets = Arc::clone(&self.assets);
                let name = name.clone();
                self.spawn_decode(label, key, move || read_asset(assets.as_ref(), &name))
            }
            ResourceDescriptor::RemoteUrl(url) => self.spawn_fetch(label, key, url.clone()),
        }
    }

    /// Resolve a dynamic host value
    ///
    /// # Errors
    /// - `ImageError::InvalidResourceType` if the value is not a descriptor
    /// - Any error from [`resolve`](Self::resolve)
    pub fn resolve_value(
        &self,
        label: &str,
        value: &Value,
        optional: bool,
    ) -> ImageResult<PendingImage> {
        let descriptor = ResourceDescriptor::from_value(label, value)?;
        self.resolve(label, &descriptor, optional)
    }

    fn spawn_decode<F>(
        &self,
        label: &str,
        key: Option<String>,
        read: F,
    ) -> ImageResult<PendingImage>
    where
        F: FnOnce() -> ImageResult<Vec<u8>> + Send + 'static,
    {
        let runtime = current_runtime()?;
        let cache = self.cache.clone();
        tracing::debug!(caller = label, key = key.as_deref(), "scheduling image decode");

        let handle = runtime.spawn_blocking(move || -> ImageResult<Image> {
            let decode = move || -> ImageResult<Image> {
                Ok(Image::Bitmap(Bitmap::decode(&read()?)?))
            };
            match key {
                Some(key) => cache.get_or_load(key, decode),
                None => decode(),
            }
        });
        Ok(PendingImage(PendingState::Decoding(handle)))
    }

    fn spawn_fetch(
        &self,
        label: &str,
        key: Option<String>,
        url: String,
    ) -> ImageResult<PendingImage> {
        let runtime = current_runtime()?;
        let cache = self.cache.clone();
        let client = self.http.clone();
        tracing::debug!(caller = label, %url, "scheduling image fetch");

        let handle = runtime.spawn(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| ImageError::fetch(&url, e))?;
            let bytes = response.bytes().await.map_err(|e| ImageError::fetch(&url, e))?;
            let image = Image::Bitmap(Bitmap::decode(&bytes)?);
            if let Some(key) = key {
                cache.insert(key, image.clone());
            }
            Ok::<_, ImageError>(image)
        });
        Ok(PendingImage(PendingState::Decoding(handle)))
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(ImageCache::default(), Arc::new(NoAssets))
    }
}

fn current_runtime() -> ImageResult<Handle> {
    Handle::try_current().map_err(|e| ImageError::WorkerFailed(e.to_string()))
}

fn read_file(path: PathBuf) -> ImageResult<Vec<u8>> {
    std::fs::read(&path).map_err(|e| ImageError::io_error(path, e))
}

fn read_asset(assets: &dyn AssetLoader, name: &str) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    assets
        .open(name)
        .and_then(|mut stream| stream.read_to_end(&mut bytes))
        .map_err(|e| ImageError::io_error(name, e))?;
    Ok(bytes)
}
