//! Opaque decoded tile bitmap.

use std::fmt;

use image::RgbaImage;

use crate::geometry::IntSize;

/// Bytes per RGBA8 pixel.
const BYTES_PER_PIXEL: usize = 4;

/// A decoded bitmap owned by one tile, the cache, or the reuse pool.
///
/// Core logic only looks at the size and byte count. Renderers reach the
/// pixels through [`TileImage::pixels`].
pub struct TileImage {
    width: u32,
    height: u32,
    pixels: Option<RgbaImage>,
}

impl TileImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            pixels: Some(pixels),
        }
    }

    /// Transparent image of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(RgbaImage::new(width, height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> IntSize {
        IntSize::new(self.width, self.height)
    }

    /// Memory held by the pixels. Zero once recycled.
    pub fn byte_count(&self) -> usize {
        if self.pixels.is_some() {
            self.width as usize * self.height as usize * BYTES_PER_PIXEL
        } else {
            0
        }
    }

    /// Release the pixels. The size stays readable.
    pub fn recycle(&mut self) {
        self.pixels = None;
    }

    pub fn is_recycled(&self) -> bool {
        self.pixels.is_none()
    }

    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    pub fn pixels_mut(&mut self) -> Option<&mut RgbaImage> {
        self.pixels.as_mut()
    }

    pub fn into_pixels(self) -> Option<RgbaImage> {
        self.pixels
    }
}

impl fmt::Debug for TileImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("recycled", &self.is_recycled())
            .finish()
    }
}
