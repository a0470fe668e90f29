//! Test utilities for integration tests.
//!
//! This module provides mock sources and decoders with request tracking,
//! gated decodes for cancellation races, and in-memory image fixtures.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};

use zoomimage::config::{EngineConfig, SubsamplingConfig};
use zoomimage::error::{DecodeError, SourceError};
use zoomimage::geometry::{IntRect, IntSize, Offset, Rect, ScaleFactor};
use zoomimage::source::{
    DecoderBackend, DecoderFactory, ImageInfo, ImageSource, RegionDecoder, TileImage,
};
use zoomimage::tile::decoded_size;
use zoomimage::transform::Transform;
use zoomimage::zoom::{ContinuousTransformType, Viewport};

// =============================================================================
// Image Fixtures
// =============================================================================

/// Encode a gradient image in memory.
pub fn encode_image(width: u32, height: u32, format: ImageFormat) -> Bytes {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    let mut out = Cursor::new(Vec::new());
    match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .write_to(&mut out, format)
            .unwrap(),
        _ => image.write_to(&mut out, format).unwrap(),
    }
    Bytes::from(out.into_inner())
}

pub fn encode_png(width: u32, height: u32) -> Bytes {
    encode_image(width, height, ImageFormat::Png)
}

/// Subsampling config with no prefetch margin and no fade-in.
pub fn exact_config() -> SubsamplingConfig {
    SubsamplingConfig {
        prefetch_tiles: 0.0,
        disable_tile_animation: true,
        ..SubsamplingConfig::default()
    }
}

pub fn engine_config(subsampling: SubsamplingConfig) -> EngineConfig {
    EngineConfig {
        subsampling,
        ..EngineConfig::default()
    }
}

// =============================================================================
// Mock Image Source
// =============================================================================

/// Image source that counts opens and can be told to fail.
pub struct MockImageSource {
    key: String,
    data: Bytes,
    fail: bool,
    open_count: AtomicUsize,
}

impl MockImageSource {
    pub fn new(key: impl Into<String>, data: Bytes) -> Self {
        Self {
            key: key.into(),
            data,
            fail: false,
            open_count: AtomicUsize::new(0),
        }
    }

    pub fn failing(key: impl Into<String>) -> Self {
        Self {
            fail: true,
            ..Self::new(key, Bytes::new())
        }
    }

    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSource for MockImageSource {
    fn key(&self) -> &str {
        &self.key
    }

    async fn open_stream(&self) -> Result<Bytes, SourceError> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SourceError::Io(format!("connection reset: {}", self.key)));
        }
        Ok(self.data.clone())
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Blocks decode threads until opened.
///
/// Waits give up after a few seconds so a failing test cannot hang the
/// runtime shutdown.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }

    pub fn close(&self) {
        *self.open.lock().unwrap() = false;
    }

    fn wait(&self) {
        let open = self.open.lock().unwrap();
        let _ = self
            .opened
            .wait_timeout_while(open, Duration::from_secs(5), |open| !*open)
            .unwrap();
    }
}

// =============================================================================
// Mock Region Decoder
// =============================================================================

/// Region decoder producing blank tiles, tracking every request.
pub struct MockDecoder {
    info: ImageInfo,
    decode_count: AtomicUsize,
    reused_count: AtomicUsize,
    requests: Mutex<Vec<(IntRect, u32)>>,
    failing: Mutex<HashSet<IntRect>>,
    gate: Option<Arc<Gate>>,
    /// Extra pixels added to every decoded tile
    oversize: u32,
}

impl MockDecoder {
    pub fn new(info: ImageInfo) -> Self {
        Self {
            info,
            decode_count: AtomicUsize::new(0),
            reused_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            gate: None,
            oversize: 0,
        }
    }

    pub fn jpeg(width: u32, height: u32) -> Self {
        Self::new(ImageInfo::new(width, height, "image/jpeg"))
    }

    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_oversize(mut self, extra: u32) -> Self {
        self.oversize = extra;
        self
    }

    /// Make decodes of `rect` fail until `heal` is called.
    pub fn fail_rect(&self, rect: IntRect) {
        self.failing.lock().unwrap().insert(rect);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn decode_count(&self) -> usize {
        self.decode_count.load(Ordering::SeqCst)
    }

    pub fn reused_count(&self) -> usize {
        self.reused_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(IntRect, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

impl RegionDecoder for MockDecoder {
    fn image_info(&self) -> &ImageInfo {
        &self.info
    }

    fn decode_region(
        &self,
        src_rect: IntRect,
        sample_size: u32,
        reuse: Option<TileImage>,
    ) -> Result<TileImage, DecodeError> {
        self.requests.lock().unwrap().push((src_rect, sample_size));
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        self.decode_count.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&src_rect) {
            return Err(DecodeError::Failed {
                message: format!("corrupt block at {}", src_rect),
            });
        }
        let size = decoded_size(src_rect, sample_size);
        let size = IntSize::new(size.width + self.oversize, size.height + self.oversize);
        match reuse {
            Some(image) if image.size() == size => {
                self.reused_count.fetch_add(1, Ordering::SeqCst);
                Ok(image)
            }
            _ => Ok(TileImage::blank(size.width, size.height)),
        }
    }
}

/// Factory handing out one shared [`MockDecoder`].
pub struct MockDecoderFactory {
    decoder: Arc<MockDecoder>,
    create_count: AtomicUsize,
}

impl MockDecoderFactory {
    pub fn new(decoder: Arc<MockDecoder>) -> Self {
        Self {
            decoder,
            create_count: AtomicUsize::new(0),
        }
    }

    pub fn create_count(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecoderFactory for MockDecoderFactory {
    fn backend(&self) -> DecoderBackend {
        DecoderBackend::Custom
    }

    async fn create(
        &self,
        source: Arc<dyn ImageSource>,
    ) -> Result<Arc<dyn RegionDecoder>, DecodeError> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        source.open_stream().await?;
        Ok(self.decoder.clone())
    }
}

// =============================================================================
// Viewports
// =============================================================================

/// Viewport of a square 1000x1000 preview of an 8000x8000 image, shown at
/// `scale` with `visible` (content coordinates) on screen.
pub fn square_viewport(scale: f32, visible: Rect) -> Viewport {
    Viewport {
        container_size: IntSize::new(1000, 1000),
        content_size: IntSize::new(1000, 1000),
        content_origin_size: IntSize::new(8000, 8000),
        transform: Transform::new(ScaleFactor::uniform(scale), Offset::ZERO, 0),
        content_visible_rect: visible,
        continuous_transform_type: ContinuousTransformType::None,
    }
}

/// Top-left quarter at 4x: sample size 2, tiles (0,0) (1,0) (0,1) (1,1).
pub fn top_left_viewport() -> Viewport {
    square_viewport(4.0, Rect::new(0.0, 0.0, 250.0, 250.0))
}

/// Bottom-right quarter at 4x: sample size 2, tiles 6..8 on both axes.
pub fn bottom_right_viewport() -> Viewport {
    square_viewport(4.0, Rect::new(750.0, 750.0, 1000.0, 1000.0))
}

/// Poll `condition` until it holds, for at most five seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
