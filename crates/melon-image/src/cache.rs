//! Decoded image cache using moka
//!
//! Bounded, least-recently-used cache of decoded images keyed by canonical
//! descriptor string. Clones share the same entries and the same on/off flag.

use crate::bitmap::Image;
use crate::error::{ImageError, ImageResult};
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default number of cached images
pub const DEFAULT_CAPACITY: u64 = 20;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
    /// Whether lookups and writes are active
    pub enabled: bool,
}

/// Decoded image cache
///
/// Disabling the cache bypasses lookups and writes but keeps existing
/// entries, so re-enabling it restores earlier hits.
#[derive(Debug, Clone)]
pub struct ImageCache {
    inner: Cache<String, Image>,
    enabled: Arc<AtomicBool>,
}

impl ImageCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Turn lookups and writes on or off
    #[inline]
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Check whether caching is active
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Get cached image, if caching is enabled
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Image> {
        if !self.is_enabled() {
            return None;
        }
        self.inner.get(key)
    }

    /// Insert image, if caching is enabled
    ///
    /// Concurrent writes for the same key are last-write-wins.
    #[inline]
    pub fn insert(&self, key: impl Into<String>, image: Image) {
        if self.is_enabled() {
            self.inner.insert(key.into(), image);
        }
    }

    /// Get cached image or load it once
    ///
    /// While enabled, concurrent loads of the same key share a single call
    /// to `load` and all observe its result. Failures are not cached. While
    /// disabled, `load` runs every time and nothing is written.
    ///
    /// # Errors
    /// Returns the error produced by `load`.
    pub fn get_or_load<F>(&self, key: impl Into<String>, load: F) -> ImageResult<Image>
    where
        F: FnOnce() -> ImageResult<Image>,
    {
        if !self.is_enabled() {
            return load();
        }
        self.inner
            .try_get_with(key.into(), load)
            .map_err(|shared: Arc<ImageError>| (*shared).clone())
    }

    /// Check if key is present, regardless of the enabled flag
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }

    /// Get entry count after applying pending evictions
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entry_count(),
            enabled: self.is_enabled(),
        }
    }
}

impl Default for ImageCache {
    /// Create cache with default capacity (20 entries)
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
