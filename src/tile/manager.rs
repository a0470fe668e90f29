//! Tile manager for one image.
//!
//! The TileManager keeps the tiles of the current viewport loaded. On every
//! refresh it:
//! - Picks the sample size for the current scale
//! - Requests tiles intersecting the visible rect plus a prefetch margin
//! - Frees tiles that left that area
//! - Keeps coarser tiles as background until finer ones cover them
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                           TileManager                             │
//! │                                                                   │
//! │  refresh(viewport) ──► tiles[sample] ──► load_tile()              │
//! │                                            │                      │
//! │                           cache hit ◄──────┤ miss                 │
//! │                                            ▼                      │
//! │                                   spawn task (semaphore)          │
//! │                                            │                      │
//! │                                   spawn_blocking decode           │
//! │                                            │                      │
//! │  apply_decode_results() ◄──── mpsc ◄───────┘                      │
//! │        │                                                          │
//! │        ├── current task: cache.put, tile Loaded, fade in          │
//! │        └── stale task:   image back to the pool                   │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tile state only changes on the thread that owns the manager. Decode
//! workers never touch tiles; their results are applied by
//! [`TileManager::apply_decode_results`].

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::config::SubsamplingConfig;
use crate::error::{DecodeError, SubsamplingError};
use crate::geometry::{IntRect, IntSize, Rect, ScaleFactor};
use crate::source::{ImageInfo, RegionDecoder, TileImage};
use crate::zoom::Viewport;

use super::cache::{TileCacheKey, TileImageCache};
use super::grid::{decoded_size, find_sample_size, preview_suffices, TileCoordinate, TileGridMap};
use super::pool::TileImagePool;
use super::tile::{Tile, TileState};

// =============================================================================
// Events and Snapshots
// =============================================================================

/// Things that happened to tiles, drained with [`TileManager::take_events`].
#[derive(Debug, Clone)]
pub enum TileEvent {
    /// The level used for foreground tiles changed. `None` means the
    /// preview is sharp enough and no tiles are shown.
    SampleSizeChanged { from: Option<u32>, to: Option<u32> },

    TileLoaded {
        coordinate: TileCoordinate,
        sample_size: u32,
    },

    TileFailed {
        coordinate: TileCoordinate,
        sample_size: u32,
        error: DecodeError,
    },

    /// A decode finished after its tile was freed
    DecodeDiscarded {
        src_rect: IntRect,
        sample_size: u32,
        pooled: bool,
    },
}

/// What a renderer needs to draw one loaded tile.
#[derive(Debug, Clone, Serialize)]
pub struct TileSnapshot {
    pub coordinate: TileCoordinate,
    pub sample_size: u32,
    /// Region in full-resolution image pixels
    pub src_rect: IntRect,
    /// Where to draw, in content coordinates
    pub display_rect: Rect,
    /// Part of the bitmap holding `src_rect`
    pub bitmap_rect: IntRect,
    pub alpha: u8,
    /// False for coarser tiles kept until the current level covers them
    pub foreground: bool,
    #[serde(skip)]
    pub image: Arc<TileImage>,
}

/// Tile counts by state across all levels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileCounts {
    pub loading: usize,
    pub loaded: usize,
    pub failed: usize,
}

// =============================================================================
// Decode Tasks
// =============================================================================

const TASK_ACTIVE: u8 = 0;
const TASK_CANCELLED: u8 = 1;
const TASK_ABANDONED: u8 = 2;

/// Cancellation state shared by the manager and one decode task.
///
/// A cancelled task that has not started decoding can still be resumed by
/// the manager. Once the task sees the cancel and gives up, resuming fails.
#[derive(Clone, Default)]
struct CancelFlag(Arc<AtomicU8>);

impl CancelFlag {
    fn cancel(&self) {
        let _ = self.0.compare_exchange(
            TASK_ACTIVE,
            TASK_CANCELLED,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Undo a cancel. False once the task has given up.
    fn resume(&self) -> bool {
        self.0
            .compare_exchange(
                TASK_CANCELLED,
                TASK_ACTIVE,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Called by the task before decoding. True if it should exit.
    fn abandon(&self) -> bool {
        self.0
            .compare_exchange(
                TASK_CANCELLED,
                TASK_ABANDONED,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn is_abandoned(&self) -> bool {
        self.0.load(Ordering::Acquire) == TASK_ABANDONED
    }
}

struct InFlight {
    task_id: u64,
    cancel: CancelFlag,
    handle: JoinHandle<()>,
}

/// Area covered by the last refresh. Failed tiles are only retried when it
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RefreshArea {
    sample_size: u32,
    visible: IntRect,
    load_rect: IntRect,
}

struct DecodeResult {
    key: TileCacheKey,
    task_id: u64,
    index: usize,
    result: Result<TileImage, DecodeError>,
}

// =============================================================================
// Tile Manager
// =============================================================================

/// Loads, displays and frees the tiles of one image.
pub struct TileManager {
    image_key: Arc<str>,
    decoder: Arc<dyn RegionDecoder>,
    image_info: ImageInfo,
    grid: TileGridMap,
    tiles: BTreeMap<u32, Vec<Tile>>,

    cache: Arc<dyn TileImageCache>,
    pool: Arc<TileImagePool>,

    runtime: Handle,
    semaphore: Arc<Semaphore>,
    in_flight: HashMap<TileCacheKey, InFlight>,
    /// Decodes whose tile was freed, kept so a re-request can join them
    cancelled: HashMap<TileCacheKey, InFlight>,
    results_tx: mpsc::UnboundedSender<DecodeResult>,
    results_rx: mpsc::UnboundedReceiver<DecodeResult>,
    next_task_id: u64,

    prefetch_tiles: f32,
    animate_tiles: bool,
    background_tiles: bool,

    sample_size: Option<u32>,
    content_size: IntSize,
    /// Visible rect of the last refresh, in image pixels
    visible_rect: IntRect,
    last_area: Option<RefreshArea>,

    events: Vec<TileEvent>,
}

impl TileManager {
    /// Create a manager for the image behind `decoder`.
    ///
    /// Decodes are spawned on the Tokio runtime current at construction.
    ///
    /// # Errors
    ///
    /// Returns [`SubsamplingError::NoRuntime`] outside a Tokio runtime.
    pub fn new(
        image_key: impl Into<Arc<str>>,
        decoder: Arc<dyn RegionDecoder>,
        cache: Arc<dyn TileImageCache>,
        pool: Arc<TileImagePool>,
        preferred_tile_size: IntSize,
        config: &SubsamplingConfig,
    ) -> Result<Self, SubsamplingError> {
        let runtime = Handle::try_current().map_err(|_| SubsamplingError::NoRuntime)?;
        let image_info = decoder.image_info().clone();
        let grid = TileGridMap::new(image_info.size(), preferred_tile_size);
        let tiles = grid
            .levels()
            .map(|level| {
                let tiles = level
                    .tiles
                    .iter()
                    .map(|spec| Tile::new(*spec, config.tile_animation_duration_ms))
                    .collect();
                (level.sample_size, tiles)
            })
            .collect();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let image_key = image_key.into();

        debug!(
            key = %image_key,
            image = %image_info.size(),
            tile_size = %preferred_tile_size,
            levels = %grid.describe(),
            "Planned tile grid"
        );

        Ok(Self {
            image_key,
            decoder,
            image_info,
            grid,
            tiles,
            cache,
            pool,
            runtime,
            semaphore: Arc::new(Semaphore::new(config.decode_parallelism.max(1))),
            in_flight: HashMap::new(),
            cancelled: HashMap::new(),
            results_tx,
            results_rx,
            next_task_id: 0,
            prefetch_tiles: config.prefetch_tiles,
            animate_tiles: !config.disable_tile_animation,
            background_tiles: !config.disable_background_tiles,
            sample_size: None,
            content_size: IntSize::ZERO,
            visible_rect: IntRect::ZERO,
            last_area: None,
            events: Vec::new(),
        })
    }

    pub fn image_key(&self) -> &str {
        &self.image_key
    }

    pub fn image_info(&self) -> &ImageInfo {
        &self.image_info
    }

    pub fn grid(&self) -> &TileGridMap {
        &self.grid
    }

    /// Sample size of the foreground level, `None` while the preview suffices.
    pub fn sample_size(&self) -> Option<u32> {
        self.sample_size
    }

    pub fn tiles(&self, sample_size: u32) -> &[Tile] {
        self.tiles.get(&sample_size).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn tile_counts(&self) -> TileCounts {
        let mut counts = TileCounts::default();
        for tile in self.tiles.values().flatten() {
            match tile.state() {
                TileState::Loading => counts.loading += 1,
                TileState::Loaded => counts.loaded += 1,
                TileState::Failed => counts.failed += 1,
                TileState::Absent => {}
            }
        }
        counts
    }

    /// True while any loaded tile is still fading in.
    pub fn is_animating(&self) -> bool {
        self.tiles.values().flatten().any(Tile::is_animating)
    }

    pub fn take_events(&mut self) -> Vec<TileEvent> {
        std::mem::take(&mut self.events)
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Bring the tiles in line with `viewport`. Returns the number of decodes
    /// started.
    pub fn refresh(&mut self, viewport: &Viewport, now_ms: u64) -> usize {
        self.apply_decode_results(now_ms);

        if !viewport.is_ready() || viewport.content_visible_rect.is_empty() {
            self.set_sample_size(None);
            self.free_all();
            return 0;
        }

        let image_size = self.image_info.size();
        self.content_size = viewport.content_size;
        let scale = viewport.transform.scale;
        let scale = scale.scale_x.abs().max(scale.scale_y.abs());
        let sample_size = find_sample_size(
            image_size,
            viewport.content_size,
            scale,
            self.grid.max_sample_size(),
        );
        if preview_suffices(image_size, viewport.content_size, sample_size) {
            trace!(key = %self.image_key, sample_size, "Preview is sharp enough");
            self.set_sample_size(None);
            self.free_all();
            return 0;
        }
        let Some(tile_src_size) = self.grid.level(sample_size).map(|level| level.tile_src_size) else {
            self.set_sample_size(None);
            self.free_all();
            return 0;
        };
        self.set_sample_size(Some(sample_size));

        let image_rect = image_size.to_rect();
        let visible = self
            .content_rect_to_image(&viewport.content_visible_rect)
            .clamp_to(&image_rect);
        let margin_x = (tile_src_size.width as f32 * self.prefetch_tiles).ceil() as i32;
        let margin_y = (tile_src_size.height as f32 * self.prefetch_tiles).ceil() as i32;
        let load_rect = visible.inflate(margin_x, margin_y).clamp_to(&image_rect);
        self.visible_rect = visible;
        let area = RefreshArea {
            sample_size,
            visible,
            load_rect,
        };
        let retry_failed = self.last_area != Some(area);
        self.last_area = Some(area);
        // Cancelled tasks that gave up will never report back
        self.cancelled.retain(|_, in_flight| !in_flight.cancel.is_abandoned());

        let center = visible.center();
        let mut wanted = Vec::new();
        let mut unwanted = Vec::new();
        for (index, tile) in self.tiles(sample_size).iter().enumerate() {
            let src_rect = tile.src_rect();
            if src_rect.overlaps(&load_rect) {
                let distance = (src_rect.center() - center).distance();
                wanted.push((index, !src_rect.overlaps(&visible), distance));
            } else {
                unwanted.push(index);
            }
        }
        for index in unwanted {
            self.free_tile(sample_size, index);
        }

        // Visible tiles first, then nearest to the center
        wanted.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.total_cmp(&b.2)));
        let mut started = 0;
        for (index, _, _) in &wanted {
            if self.load_tile(sample_size, *index, retry_failed, now_ms) {
                started += 1;
            }
        }
        self.update_background();

        debug!(
            key = %self.image_key,
            sample_size,
            visible = %visible,
            wanted = wanted.len(),
            started,
            "Refreshed tiles"
        );
        started
    }

    /// Free every tile and cancel every pending decode.
    pub fn free_all(&mut self) {
        self.last_area = None;
        let all: Vec<(u32, usize)> = self
            .tiles
            .iter()
            .flat_map(|(sample, tiles)| (0..tiles.len()).map(move |index| (*sample, index)))
            .collect();
        for (sample, index) in all {
            self.free_tile(sample, index);
        }
    }

    fn set_sample_size(&mut self, sample_size: Option<u32>) {
        if self.sample_size != sample_size {
            debug!(
                key = %self.image_key,
                from = ?self.sample_size,
                to = ?sample_size,
                "Sample size changed"
            );
            self.events.push(TileEvent::SampleSizeChanged {
                from: self.sample_size,
                to: sample_size,
            });
            self.sample_size = sample_size;
        }
    }

    fn content_rect_to_image(&self, rect: &Rect) -> IntRect {
        let image = self.image_info.size();
        let factor = ScaleFactor::new(
            image.width as f32 / self.content_size.width as f32,
            image.height as f32 / self.content_size.height as f32,
        );
        rect.scale(factor).round_out()
    }

    fn image_rect_to_content(&self, rect: &IntRect) -> Rect {
        let image = self.image_info.size();
        let factor = ScaleFactor::new(
            self.content_size.width as f32 / image.width as f32,
            self.content_size.height as f32 / image.height as f32,
        );
        rect.to_rect().scale(factor)
    }

    /// Drop coarser tiles once the foreground covers them.
    ///
    /// A tile of another level survives only while it is loaded, visible,
    /// and overlaps a visible foreground tile that is not loaded yet.
    fn update_background(&mut self) {
        let Some(sample_size) = self.sample_size else {
            return;
        };
        let visible = self.visible_rect;
        let pending: Vec<IntRect> = self
            .tiles(sample_size)
            .iter()
            .filter(|tile| tile.state() != TileState::Loaded && tile.src_rect().overlaps(&visible))
            .map(Tile::src_rect)
            .collect();

        let mut stale = Vec::new();
        for (sample, tiles) in &self.tiles {
            if *sample == sample_size {
                continue;
            }
            for (index, tile) in tiles.iter().enumerate() {
                if tile.state() == TileState::Absent {
                    continue;
                }
                let keep = self.background_tiles
                    && tile.state() == TileState::Loaded
                    && tile.src_rect().overlaps(&visible)
                    && pending.iter().any(|rect| rect.overlaps(&tile.src_rect()));
                if !keep {
                    stale.push((*sample, index));
                }
            }
        }
        for (sample, index) in stale {
            self.free_tile(sample, index);
        }
    }

    // -------------------------------------------------------------------------
    // Loading and Freeing
    // -------------------------------------------------------------------------

    /// Make sure a tile is loaded or loading. Failed tiles stay failed unless
    /// `retry_failed` is set. Returns true when a decode was spawned.
    fn load_tile(&mut self, sample_size: u32, index: usize, retry_failed: bool, now_ms: u64) -> bool {
        let Some(tile) = self.tiles.get_mut(&sample_size).and_then(|t| t.get_mut(index)) else {
            return false;
        };
        match tile.state() {
            TileState::Loaded | TileState::Loading => return false,
            TileState::Failed if !retry_failed => return false,
            TileState::Failed | TileState::Absent => {}
        }
        let src_rect = tile.src_rect();
        let key = TileCacheKey::new(self.image_key.clone(), src_rect, sample_size);

        if self.in_flight.contains_key(&key) {
            tile.set_state(TileState::Loading);
            return false;
        }

        // Join a decode cancelled earlier if it has not given up yet
        if let Some(in_flight) = self.cancelled.remove(&key) {
            if in_flight.cancel.resume() {
                trace!(rect = %src_rect, sample_size, "Resumed cancelled decode");
                tile.set_state(TileState::Loading);
                self.in_flight.insert(key, in_flight);
                return false;
            }
        }

        if let Some(image) = self.cache.get(&key) {
            trace!(rect = %src_rect, sample_size, "Tile cache hit");
            self.cache.set_displayed(&key, true);
            tile.set_image(Some(image), false, now_ms);
            return false;
        }

        let task_id = self.next_task_id;
        self.next_task_id += 1;
        let cancel = CancelFlag::default();
        let expected = tile.decoded_size();
        tile.set_state(TileState::Loading);

        let task = DecodeTask {
            key: key.clone(),
            task_id,
            index,
            expected,
            cancel: cancel.clone(),
            decoder: self.decoder.clone(),
            pool: self.pool.clone(),
            semaphore: self.semaphore.clone(),
            results: self.results_tx.clone(),
        };
        let handle = self.runtime.spawn(task.run());
        self.in_flight.insert(
            key,
            InFlight {
                task_id,
                cancel,
                handle,
            },
        );
        true
    }

    /// Return a tile to `Absent`, cancelling its decode or releasing its
    /// image.
    fn free_tile(&mut self, sample_size: u32, index: usize) {
        let Some(tile) = self.tiles.get_mut(&sample_size).and_then(|t| t.get_mut(index)) else {
            return;
        };
        let key = TileCacheKey::new(self.image_key.clone(), tile.src_rect(), sample_size);
        match tile.state() {
            TileState::Absent => {}
            TileState::Loading => {
                if let Some(in_flight) = self.in_flight.remove(&key) {
                    // A decode already running still reports back and its
                    // image goes to the pool unless the tile is requested
                    // again first
                    in_flight.cancel.cancel();
                    self.cancelled.insert(key, in_flight);
                }
                tile.set_state(TileState::Absent);
            }
            TileState::Loaded => {
                // Drop our handle first so the cache can pool the image
                drop(tile.set_image(None, false, 0));
                self.cache.set_displayed(&key, false);
            }
            TileState::Failed => tile.set_state(TileState::Absent),
        }
    }

    // -------------------------------------------------------------------------
    // Decode Results
    // -------------------------------------------------------------------------

    /// Apply every decode result that has arrived. Returns how many tiles
    /// changed state.
    pub fn apply_decode_results(&mut self, now_ms: u64) -> usize {
        let mut applied = 0;
        while let Ok(result) = self.results_rx.try_recv() {
            if self.handle_result(result, now_ms) {
                applied += 1;
            }
        }
        if applied > 0 {
            self.update_background();
        }
        applied
    }

    /// Wait for one decode result and apply it. Returns whether a tile
    /// changed state.
    pub async fn next_decode_result(&mut self, now_ms: u64) -> bool {
        let Some(result) = self.results_rx.recv().await else {
            return false;
        };
        let applied = self.handle_result(result, now_ms);
        if applied {
            self.update_background();
        }
        applied
    }

    /// Wait until no decode is pending. Returns how many tiles changed state.
    pub async fn wait_for_decodes(&mut self, now_ms: u64) -> usize {
        let mut applied = 0;
        while !self.in_flight.is_empty() {
            let Some(result) = self.results_rx.recv().await else {
                break;
            };
            if self.handle_result(result, now_ms) {
                applied += 1;
            }
        }
        applied += self.apply_decode_results(now_ms);
        self.update_background();
        applied
    }

    fn handle_result(&mut self, result: DecodeResult, now_ms: u64) -> bool {
        let DecodeResult {
            key,
            task_id,
            index,
            result,
        } = result;

        let current = self
            .in_flight
            .get(&key)
            .is_some_and(|in_flight| in_flight.task_id == task_id);
        if !current {
            if self
                .cancelled
                .get(&key)
                .is_some_and(|in_flight| in_flight.task_id == task_id)
            {
                self.cancelled.remove(&key);
            }
            if let Ok(image) = result {
                let slot = decoded_size(key.src_rect, key.sample_size);
                let pooled = self.pool.offer(slot, image);
                debug!(
                    rect = %key.src_rect,
                    sample_size = key.sample_size,
                    pooled,
                    "Discarded decode for freed tile"
                );
                self.events.push(TileEvent::DecodeDiscarded {
                    src_rect: key.src_rect,
                    sample_size: key.sample_size,
                    pooled,
                });
            }
            return false;
        }
        self.in_flight.remove(&key);

        let Some(tile) = self.tiles.get_mut(&key.sample_size).and_then(|t| t.get_mut(index)) else {
            return false;
        };
        let coordinate = tile.coordinate();
        match result {
            Ok(image) => {
                let image = self.cache.put(key.clone(), image, &self.image_info);
                self.cache.set_displayed(&key, true);
                tile.set_image(Some(image), self.animate_tiles, now_ms);
                trace!(tile = %coordinate, sample_size = key.sample_size, "Tile loaded");
                self.events.push(TileEvent::TileLoaded {
                    coordinate,
                    sample_size: key.sample_size,
                });
            }
            Err(error) => {
                warn!(
                    key = %self.image_key,
                    tile = %coordinate,
                    sample_size = key.sample_size,
                    error = %error,
                    "Tile decode failed"
                );
                tile.set_state(TileState::Failed);
                self.events.push(TileEvent::TileFailed {
                    coordinate,
                    sample_size: key.sample_size,
                    error,
                });
            }
        }
        true
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    /// Loaded tiles in draw order: background levels from coarsest to
    /// finest, then the foreground level. Advances fade-ins to `now_ms`.
    pub fn tile_snapshots(&mut self, now_ms: u64) -> Vec<TileSnapshot> {
        let foreground = self.sample_size;
        let mut order: Vec<u32> = self
            .tiles
            .keys()
            .rev()
            .copied()
            .filter(|sample| Some(*sample) != foreground)
            .collect();
        order.extend(foreground);

        let mut snapshots = Vec::new();
        for sample in order {
            let Some(tiles) = self.tiles.get_mut(&sample) else {
                continue;
            };
            let mut loaded = Vec::new();
            for tile in tiles.iter_mut() {
                let Some(image) = tile.image().cloned() else {
                    continue;
                };
                let alpha = tile.alpha(now_ms);
                loaded.push((tile.coordinate(), tile.src_rect(), tile.decoded_size(), alpha, image));
            }
            for (coordinate, src_rect, expected, alpha, image) in loaded {
                let bitmap_rect = IntRect::new(
                    0,
                    0,
                    expected.width.min(image.width()) as i32,
                    expected.height.min(image.height()) as i32,
                );
                snapshots.push(TileSnapshot {
                    coordinate,
                    sample_size: sample,
                    src_rect,
                    display_rect: self.image_rect_to_content(&src_rect),
                    bitmap_rect,
                    alpha,
                    foreground: Some(sample) == foreground,
                    image,
                });
            }
        }
        snapshots
    }
}

impl Drop for TileManager {
    fn drop(&mut self) {
        for in_flight in self.in_flight.values().chain(self.cancelled.values()) {
            in_flight.cancel.cancel();
            in_flight.handle.abort();
        }
        self.free_all();
    }
}

/// Everything a decode worker needs, moved into the spawned task.
struct DecodeTask {
    key: TileCacheKey,
    task_id: u64,
    index: usize,
    expected: IntSize,
    cancel: CancelFlag,
    decoder: Arc<dyn RegionDecoder>,
    pool: Arc<TileImagePool>,
    semaphore: Arc<Semaphore>,
    results: mpsc::UnboundedSender<DecodeResult>,
}

impl DecodeTask {
    async fn run(self) {
        let Ok(_permit) = self.semaphore.acquire_owned().await else {
            return;
        };
        // Freed while queued and not requested again
        if self.cancel.abandon() {
            return;
        }
        let reuse = self.pool.take(self.expected);
        let decoder = self.decoder;
        let src_rect = self.key.src_rect;
        let sample_size = self.key.sample_size;
        let result = tokio::task::spawn_blocking(move || {
            decoder.decode_region(src_rect, sample_size, reuse)
        })
        .await
        .unwrap_or_else(|e| {
            Err(DecodeError::Aborted {
                message: e.to_string(),
            })
        });
        // The manager may be gone
        let _ = self.results.send(DecodeResult {
            key: self.key,
            task_id: self.task_id,
            index: self.index,
            result,
        });
    }
}
