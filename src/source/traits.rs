use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, SourceError};
use crate::geometry::IntRect;

use super::info::ImageInfo;
use super::tile_image::TileImage;

/// Re-openable source of encoded image bytes.
///
/// Every tile decode may open the stream again, so implementations must
/// return the same bytes on every call.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Stable identifier, used in cache keys and logs.
    fn key(&self) -> &str;

    /// Read the whole encoded image.
    async fn open_stream(&self) -> Result<Bytes, SourceError>;
}

/// Decodes rectangular regions of one image at a power-of-two sample size.
///
/// Calls block and run on a blocking worker thread. Rectangles are in the
/// space described by [`RegionDecoder::image_info`].
pub trait RegionDecoder: Send + Sync {
    fn image_info(&self) -> &ImageInfo;

    /// Decode `src_rect` downscaled by `sample_size`.
    ///
    /// The result is nominally `ceil(w / sample_size) x ceil(h / sample_size)`
    /// but may be larger near image edges. `reuse` is a pooled image of the
    /// expected size that the decoder may fill instead of allocating.
    fn decode_region(
        &self,
        src_rect: IntRect,
        sample_size: u32,
        reuse: Option<TileImage>,
    ) -> Result<TileImage, DecodeError>;
}

/// Decoder implementations available to the subsampling engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderBackend {
    /// Pure Rust decoding with the `image` crate
    ImageRs,
    /// Operating system codec
    Platform,
    /// Anything supplied by the embedding application
    Custom,
}

impl fmt::Display for DecoderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecoderBackend::ImageRs => "image-rs",
            DecoderBackend::Platform => "platform",
            DecoderBackend::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Creates region decoders for image sources.
#[async_trait]
pub trait DecoderFactory: Send + Sync {
    fn backend(&self) -> DecoderBackend;

    /// Read the image header and return a decoder for it.
    async fn create(
        &self,
        source: Arc<dyn ImageSource>,
    ) -> Result<Arc<dyn RegionDecoder>, DecodeError>;
}

// =============================================================================
// Sources
// =============================================================================

/// Image bytes held in memory.
#[derive(Clone)]
pub struct MemoryImageSource {
    key: String,
    data: Bytes,
}

impl MemoryImageSource {
    pub fn new(key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            data: data.into(),
        }
    }
}

#[async_trait]
impl ImageSource for MemoryImageSource {
    fn key(&self) -> &str {
        &self.key
    }

    async fn open_stream(&self) -> Result<Bytes, SourceError> {
        if self.data.is_empty() {
            return Err(SourceError::Empty(self.key.clone()));
        }
        Ok(self.data.clone())
    }
}

/// Image file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    key: String,
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            key: format!("file://{}", path.display()),
            path,
        }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    fn key(&self) -> &str {
        &self.key
    }

    async fn open_stream(&self) -> Result<Bytes, SourceError> {
        let data = tokio::fs::read(&self.path).await?;
        if data.is_empty() {
            return Err(SourceError::Empty(self.key.clone()));
        }
        Ok(Bytes::from(data))
    }
}
