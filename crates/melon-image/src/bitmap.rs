//! Decoded image values

use crate::error::ImageResult;
use crate::icons::PlatformIcon;
use std::fmt;
use std::sync::Arc;

/// RGBA8 pixel buffer
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Bitmap {
    /// Create bitmap from raw RGBA8 pixels
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected).then(|| Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Decode an encoded image (PNG, JPEG) into a bitmap
    ///
    /// # Errors
    /// `ImageError::Decode` if the bytes are not a supported image.
    pub fn decode(bytes: &[u8]) -> ImageResult<Self> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw().into(),
        })
    }

    /// Width in pixels
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// A resolved image: either a platform icon or decoded pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Image {
    /// Built-in platform icon
    Icon(PlatformIcon),
    /// Decoded bitmap
    Bitmap(Bitmap),
}

impl Image {
    /// Get bitmap if this image carries pixels
    #[inline]
    #[must_use]
    pub fn as_bitmap(&self) -> Option<&Bitmap> {
        match self {
            Self::Bitmap(b) => Some(b),
            Self::Icon(_) => None,
        }
    }

    /// Get icon if this image is a platform icon
    #[inline]
    #[must_use]
    pub fn as_icon(&self) -> Option<PlatformIcon> {
        match self {
            Self::Icon(i) => Some(*i),
            Self::Bitmap(_) => None,
        }
    }
}

impl From<Bitmap> for Image {
    fn from(bitmap: Bitmap) -> Self {
        Self::Bitmap(bitmap)
    }
}

impl From<PlatformIcon> for Image {
    fn from(icon: PlatformIcon) -> Self {
        Self::Icon(icon)
    }
}
