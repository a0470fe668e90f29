//! Region decoder wrapper that applies EXIF orientation.

use std::sync::Arc;

use image::imageops;

use crate::error::DecodeError;
use crate::geometry::{IntRect, IntSize};

use super::info::{ExifOrientation, ImageInfo};
use super::tile_image::TileImage;
use super::traits::RegionDecoder;

/// Presents an oriented image as if it were stored upright.
///
/// `image_info` reports the display size with `Normal` orientation, tile
/// rectangles are taken in display space, mapped to stored pixel space for
/// the inner decoder, and the decoded pixels are re-oriented.
pub struct ExifRegionDecoder {
    inner: Arc<dyn RegionDecoder>,
    orientation: ExifOrientation,
    raw_size: IntSize,
    info: ImageInfo,
}

impl ExifRegionDecoder {
    pub fn new(inner: Arc<dyn RegionDecoder>) -> Self {
        let raw = inner.image_info();
        let orientation = raw.exif_orientation;
        let raw_size = raw.size();
        let info = raw.oriented();
        Self {
            inner,
            orientation,
            raw_size,
            info,
        }
    }

    /// Wrap `inner` only when its image needs re-orienting.
    pub fn wrap(inner: Arc<dyn RegionDecoder>) -> Arc<dyn RegionDecoder> {
        if inner.image_info().exif_orientation == ExifOrientation::Normal {
            inner
        } else {
            Arc::new(Self::new(inner))
        }
    }

    pub fn orientation(&self) -> ExifOrientation {
        self.orientation
    }
}

impl RegionDecoder for ExifRegionDecoder {
    fn image_info(&self) -> &ImageInfo {
        &self.info
    }

    fn decode_region(
        &self,
        src_rect: IntRect,
        sample_size: u32,
        reuse: Option<TileImage>,
    ) -> Result<TileImage, DecodeError> {
        let raw_rect = self.orientation.display_rect_to_raw(src_rect, self.raw_size);
        // Pooled images come in display orientation
        let reuse = if self.orientation.swaps_axes() {
            None
        } else {
            reuse
        };
        let decoded = self.inner.decode_region(raw_rect, sample_size, reuse)?;
        let Some(pixels) = decoded.into_pixels() else {
            return Err(DecodeError::Failed {
                message: "decoder returned a recycled image".to_string(),
            });
        };
        let oriented = match self.orientation {
            ExifOrientation::Normal => pixels,
            ExifOrientation::FlipHorizontal => imageops::flip_horizontal(&pixels),
            ExifOrientation::Rotate180 => imageops::rotate180(&pixels),
            ExifOrientation::FlipVertical => imageops::flip_vertical(&pixels),
            ExifOrientation::Transpose => imageops::flip_horizontal(&imageops::rotate90(&pixels)),
            ExifOrientation::Rotate90 => imageops::rotate90(&pixels),
            ExifOrientation::Transverse => {
                imageops::flip_horizontal(&imageops::rotate270(&pixels))
            }
            ExifOrientation::Rotate270 => imageops::rotate270(&pixels),
        };
        Ok(TileImage::new(oriented))
    }
}
