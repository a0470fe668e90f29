//! Region decoding with the `image` crate.
//!
//! The `image` crate has no true region decoder, so the first tile request
//! decodes the whole image once and later requests sample regions out of
//! the decoded buffer. The header (size, format, EXIF orientation) is read
//! without decoding pixels, which keeps `prepare` cheap for images that end
//! up not needing tiles.

use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, ImageReader, Rgba, RgbaImage};
use tracing::debug;

use crate::error::DecodeError;
use crate::geometry::IntRect;

use super::info::{is_region_decodable, ExifOrientation, ImageInfo};
use super::tile_image::TileImage;
use super::traits::{DecoderBackend, DecoderFactory, ImageSource, RegionDecoder};

/// Read the EXIF orientation of an encoded image, `Normal` when absent.
pub fn read_exif_orientation(data: &[u8]) -> ExifOrientation {
    let mut cursor = Cursor::new(data);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut cursor) else {
        return ExifOrientation::Normal;
    };
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(ExifOrientation::from_exif)
        .unwrap_or_default()
}

// =============================================================================
// Decoder
// =============================================================================

/// Region decoder backed by a fully decoded RGBA buffer.
pub struct ImageRsRegionDecoder {
    key: String,
    data: Bytes,
    format: ImageFormat,
    info: ImageInfo,
    decoded: OnceLock<Result<RgbaImage, DecodeError>>,
}

impl ImageRsRegionDecoder {
    /// Read the header of an encoded image.
    pub fn from_bytes(key: impl Into<String>, data: Bytes) -> Result<Self, DecodeError> {
        let key = key.into();
        let format = image::guess_format(&data).map_err(|e| DecodeError::UnsupportedFormat {
            reason: e.to_string(),
        })?;
        let mime_type = format.to_mime_type();
        if !is_region_decodable(mime_type) {
            return Err(DecodeError::UnsupportedFormat {
                reason: format!("{} cannot be region-decoded", mime_type),
            });
        }
        let (width, height) = ImageReader::with_format(Cursor::new(&data[..]), format)
            .into_dimensions()
            .map_err(|e| DecodeError::UnsupportedFormat {
                reason: e.to_string(),
            })?;
        let orientation = read_exif_orientation(&data);
        let info = ImageInfo::new(width, height, mime_type).with_orientation(orientation);
        debug!(key = %key, info = %info, "Read image header");
        Ok(Self {
            key,
            data,
            format,
            info,
            decoded: OnceLock::new(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn pixels(&self) -> Result<&RgbaImage, DecodeError> {
        self.decoded
            .get_or_init(|| {
                debug!(key = %self.key, "Decoding full image");
                image::load_from_memory_with_format(&self.data, self.format)
                    .map(|image| image.to_rgba8())
                    .map_err(|e| DecodeError::Failed {
                        message: e.to_string(),
                    })
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl RegionDecoder for ImageRsRegionDecoder {
    fn image_info(&self) -> &ImageInfo {
        &self.info
    }

    fn decode_region(
        &self,
        src_rect: IntRect,
        sample_size: u32,
        reuse: Option<TileImage>,
    ) -> Result<TileImage, DecodeError> {
        if sample_size == 0 || !sample_size.is_power_of_two() {
            return Err(DecodeError::InvalidSampleSize(sample_size));
        }
        let bounds = self.info.size().to_rect();
        if src_rect.is_empty() || !bounds.contains_rect(&src_rect) {
            return Err(DecodeError::InvalidRegion {
                rect: src_rect,
                width: self.info.width,
                height: self.info.height,
            });
        }
        let full = self.pixels()?;
        let out = sample_region(full, src_rect, sample_size, reuse);
        Ok(TileImage::new(out))
    }
}

/// Box-filter `rect` of `full` down by `sample_size`, writing into the
/// pooled buffer when its size matches.
fn sample_region(full: &RgbaImage, rect: IntRect, sample_size: u32, reuse: Option<TileImage>) -> RgbaImage {
    let s = sample_size as i32;
    let out_width = (rect.width() + s - 1) / s;
    let out_height = (rect.height() + s - 1) / s;
    let mut out = reuse
        .filter(|image| image.width() == out_width as u32 && image.height() == out_height as u32)
        .and_then(TileImage::into_pixels)
        .unwrap_or_else(|| RgbaImage::new(out_width as u32, out_height as u32));

    for oy in 0..out_height {
        let y0 = rect.top + oy * s;
        let y1 = (y0 + s).min(rect.bottom);
        for ox in 0..out_width {
            let x0 = rect.left + ox * s;
            let x1 = (x0 + s).min(rect.right);
            let mut sum = [0u32; 4];
            let mut count = 0u32;
            for y in y0..y1 {
                for x in x0..x1 {
                    let p = full.get_pixel(x as u32, y as u32);
                    for (acc, channel) in sum.iter_mut().zip(p.0.iter()) {
                        *acc += *channel as u32;
                    }
                    count += 1;
                }
            }
            let count = count.max(1);
            let pixel = Rgba([
                (sum[0] / count) as u8,
                (sum[1] / count) as u8,
                (sum[2] / count) as u8,
                (sum[3] / count) as u8,
            ]);
            out.put_pixel(ox as u32, oy as u32, pixel);
        }
    }
    out
}

// =============================================================================
// Factory
// =============================================================================

/// Creates [`ImageRsRegionDecoder`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRsDecoderFactory;

impl ImageRsDecoderFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DecoderFactory for ImageRsDecoderFactory {
    fn backend(&self) -> DecoderBackend {
        DecoderBackend::ImageRs
    }

    async fn create(
        &self,
        source: Arc<dyn ImageSource>,
    ) -> Result<Arc<dyn RegionDecoder>, DecodeError> {
        let data = source.open_stream().await?;
        let key = source.key().to_string();
        let decoder = tokio::task::spawn_blocking(move || ImageRsRegionDecoder::from_bytes(key, data))
            .await
            .map_err(|e| DecodeError::Aborted {
                message: e.to_string(),
            })??;
        Ok(Arc::new(decoder))
    }
}
