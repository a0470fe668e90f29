//! Subsampling engine for one displayed image.
//!
//! The SubsamplingEngine decides whether an image needs tiles at all and
//! then forwards viewport changes to a [`TileManager`]:
//!
//! ```text
//! prepare(factory, source, content)
//!     │
//!     ├── factory.create(source) ── error ──► Disabled(Source | Decode)
//!     ├── mime type not region-decodable ───► Disabled(UnsupportedMimeType)
//!     ├── image not larger than content ────► Disabled(ImageTooSmall)
//!     ├── aspect ratio differs ─────────────► Disabled(AspectRatioMismatch)
//!     └── ExifRegionDecoder + TileManager ──► Ready
//!
//! refresh(viewport) ──► TileManager::refresh   (skipped while stopped, or
//!                                               while transforming if paused)
//! ```
//!
//! Disabling is never fatal: zoom keeps working on the preview content and
//! the reason is logged and broadcast as a [`SubsamplingEvent`].

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::SubsamplingConfig;
use crate::error::{DecodeError, SubsamplingError};
use crate::geometry::IntSize;
use crate::source::{
    is_region_decodable, DecoderBackend, DecoderFactory, ExifRegionDecoder, ImageInfo, ImageSource,
};
use crate::tile::{
    calculate_preferred_tile_size, LruTileImageCache, TileCounts, TileEvent, TileGridMap,
    TileImageCache, TileImagePool, TileManager, TileSnapshot,
};
use crate::zoom::{ContinuousTransformType, Viewport};

/// Allowed relative difference between the image and content aspect ratios.
pub const ASPECT_RATIO_TOLERANCE: f32 = 0.1;

/// Capacity of the event channel; slow subscribers miss older events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Observable subsampling state changes.
#[derive(Debug, Clone)]
pub enum SubsamplingEvent {
    /// Tiles will be used for this image
    Ready {
        image_key: String,
        image_info: ImageInfo,
        backend: DecoderBackend,
    },

    /// Tiles will not be used; zoom continues on the preview content
    Disabled { reason: SubsamplingError },

    /// Lifecycle stop or resume
    Stopped(bool),

    Tile(TileEvent),
}

/// Check whether tiles can improve on content of `content_size`.
pub fn check_subsampling(info: &ImageInfo, content_size: IntSize) -> Result<(), SubsamplingError> {
    if content_size.is_empty() {
        return Err(SubsamplingError::NotReady(format!(
            "content size is {}",
            content_size
        )));
    }
    if !is_region_decodable(&info.mime_type) {
        return Err(SubsamplingError::UnsupportedMimeType(info.mime_type.clone()));
    }
    let image = info.size();
    if image.width <= content_size.width && image.height <= content_size.height {
        return Err(SubsamplingError::ImageTooSmall {
            image,
            content: content_size,
        });
    }
    // Content scaled up to the image width must match the image height
    let scaled_height = content_size.height as f32 * image.width as f32 / content_size.width as f32;
    if (scaled_height - image.height as f32).abs() > image.height as f32 * ASPECT_RATIO_TOLERANCE {
        return Err(SubsamplingError::AspectRatioMismatch {
            image,
            content: content_size,
        });
    }
    Ok(())
}

/// Owns the tiles of one image and the rules for when to show them.
pub struct SubsamplingEngine {
    config: SubsamplingConfig,
    cache: Arc<dyn TileImageCache>,
    pool: Arc<TileImagePool>,

    manager: Option<TileManager>,
    backend: Option<DecoderBackend>,
    disabled: Option<SubsamplingError>,
    stopped: bool,

    events: broadcast::Sender<SubsamplingEvent>,
}

impl SubsamplingEngine {
    /// Create an engine with its own cache and pool sized from `config`.
    pub fn new(config: SubsamplingConfig) -> Self {
        let pool = Arc::new(TileImagePool::with_capacity(config.pool_bytes));
        let cache = Arc::new(
            LruTileImageCache::with_capacity_and_entries(
                config.tile_cache_bytes,
                config.max_cache_entries,
            )
            .with_pool(pool.clone()),
        );
        Self::with_cache(config, cache, pool)
    }

    /// Create an engine sharing `cache` and `pool` with other images.
    pub fn with_cache(
        config: SubsamplingConfig,
        cache: Arc<dyn TileImageCache>,
        pool: Arc<TileImagePool>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            cache,
            pool,
            manager: None,
            backend: None,
            disabled: None,
            stopped: false,
            events,
        }
    }

    pub fn config(&self) -> &SubsamplingConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SubsamplingEvent> {
        self.events.subscribe()
    }

    /// Open `source` and set up tiles for content of `content_size` shown
    /// in a container of `container_size`.
    ///
    /// Any previous image is released first. On error subsampling stays
    /// disabled until the next `prepare`.
    pub async fn prepare(
        &mut self,
        factory: &dyn DecoderFactory,
        source: Arc<dyn ImageSource>,
        content_size: IntSize,
        container_size: IntSize,
    ) -> Result<ImageInfo, SubsamplingError> {
        self.clear();
        match self
            .try_prepare(factory, source.clone(), content_size, container_size)
            .await
        {
            Ok(manager) => {
                let image_info = manager.image_info().clone();
                info!(
                    key = %source.key(),
                    image = %image_info,
                    backend = %factory.backend(),
                    levels = %manager.grid().describe(),
                    "Subsampling ready"
                );
                self.manager = Some(manager);
                self.backend = Some(factory.backend());
                self.emit(SubsamplingEvent::Ready {
                    image_key: source.key().to_string(),
                    image_info: image_info.clone(),
                    backend: factory.backend(),
                });
                Ok(image_info)
            }
            Err(reason) => {
                warn!(key = %source.key(), reason = %reason, "Subsampling disabled");
                self.disabled = Some(reason.clone());
                self.emit(SubsamplingEvent::Disabled {
                    reason: reason.clone(),
                });
                Err(reason)
            }
        }
    }

    async fn try_prepare(
        &self,
        factory: &dyn DecoderFactory,
        source: Arc<dyn ImageSource>,
        content_size: IntSize,
        container_size: IntSize,
    ) -> Result<TileManager, SubsamplingError> {
        if container_size.is_empty() {
            return Err(SubsamplingError::NotReady(format!(
                "container size is {}",
                container_size
            )));
        }
        let decoder = factory
            .create(source.clone())
            .await
            .map_err(|e| match e {
                DecodeError::Source(source) => SubsamplingError::Source(source),
                other => SubsamplingError::Decode(other),
            })?;
        let decoder = ExifRegionDecoder::wrap(decoder);
        check_subsampling(decoder.image_info(), content_size)?;

        TileManager::new(
            source.key(),
            decoder,
            self.cache.clone(),
            self.pool.clone(),
            calculate_preferred_tile_size(container_size),
            &self.config,
        )
    }

    /// Release the current image and every tile it holds.
    pub fn clear(&mut self) {
        if let Some(manager) = self.manager.take() {
            debug!(key = %manager.image_key(), "Releasing subsampling image");
        }
        self.backend = None;
        self.disabled = None;
    }

    /// Stop or resume tile loading. Stopping frees every tile.
    pub fn set_stopped(&mut self, stopped: bool) {
        if self.stopped == stopped {
            return;
        }
        self.stopped = stopped;
        if stopped {
            if let Some(manager) = self.manager.as_mut() {
                manager.free_all();
            }
        }
        debug!(stopped, "Subsampling lifecycle changed");
        self.emit(SubsamplingEvent::Stopped(stopped));
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Recompute the tiles for `viewport`. Returns the number of decodes
    /// started.
    pub fn refresh(&mut self, viewport: &Viewport, now_ms: u64) -> usize {
        if self.stopped {
            return 0;
        }
        let paused = self.config.pause_when_transforming
            && viewport.continuous_transform_type != ContinuousTransformType::None;
        let Some(manager) = self.manager.as_mut() else {
            return 0;
        };
        let started = if paused {
            manager.apply_decode_results(now_ms);
            0
        } else {
            manager.refresh(viewport, now_ms)
        };
        self.forward_events();
        started
    }

    /// Apply finished decodes. Returns how many tiles changed state.
    pub fn apply_decode_results(&mut self, now_ms: u64) -> usize {
        let Some(manager) = self.manager.as_mut() else {
            return 0;
        };
        let applied = manager.apply_decode_results(now_ms);
        self.forward_events();
        applied
    }

    /// Wait for every pending decode and apply the results.
    pub async fn wait_for_decodes(&mut self, now_ms: u64) -> usize {
        let Some(manager) = self.manager.as_mut() else {
            return 0;
        };
        let applied = manager.wait_for_decodes(now_ms).await;
        self.forward_events();
        applied
    }

    /// Loaded tiles in draw order.
    pub fn tile_snapshots(&mut self, now_ms: u64) -> Vec<TileSnapshot> {
        match self.manager.as_mut() {
            Some(manager) if !self.stopped => manager.tile_snapshots(now_ms),
            _ => Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn is_ready(&self) -> bool {
        self.manager.is_some()
    }

    /// Why the last `prepare` failed.
    pub fn disabled_reason(&self) -> Option<&SubsamplingError> {
        self.disabled.as_ref()
    }

    pub fn backend(&self) -> Option<DecoderBackend> {
        self.backend
    }

    pub fn image_info(&self) -> Option<&ImageInfo> {
        self.manager.as_ref().map(TileManager::image_info)
    }

    pub fn grid(&self) -> Option<&TileGridMap> {
        self.manager.as_ref().map(TileManager::grid)
    }

    pub fn sample_size(&self) -> Option<u32> {
        self.manager.as_ref().and_then(TileManager::sample_size)
    }

    pub fn tile_counts(&self) -> TileCounts {
        self.manager
            .as_ref()
            .map(TileManager::tile_counts)
            .unwrap_or_default()
    }

    pub fn in_flight_count(&self) -> usize {
        self.manager.as_ref().map_or(0, TileManager::in_flight_count)
    }

    pub fn is_animating(&self) -> bool {
        self.manager.as_ref().is_some_and(TileManager::is_animating)
    }

    pub fn manager(&self) -> Option<&TileManager> {
        self.manager.as_ref()
    }

    pub fn pool(&self) -> &Arc<TileImagePool> {
        &self.pool
    }

    fn forward_events(&mut self) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        for event in manager.take_events() {
            // No subscribers is fine
            let _ = self.events.send(SubsamplingEvent::Tile(event));
        }
    }

    fn emit(&self, event: SubsamplingEvent) {
        let _ = self.events.send(event);
    }
}

impl Default for SubsamplingEngine {
    fn default() -> Self {
        Self::new(SubsamplingConfig::default())
    }
}
