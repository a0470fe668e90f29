//! Memory cache for decoded tile images.
//!
//! Tiles are cached by a composite key:
//! - Image key (stable source identifier)
//! - Source rectangle in image pixels
//! - Sample size
//!
//! # Size-Based Eviction
//!
//! The cache tracks the total byte count of cached images and evicts
//! least-recently-used entries when the capacity is exceeded. Entries that
//! are currently displayed by a tile are never evicted; the cache may run
//! over budget until they are released. Evicted images go to the reuse pool
//! when nothing else holds them.

use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::{debug, trace};

use crate::geometry::IntRect;
use crate::source::{ImageInfo, TileImage};

use super::pool::TileImagePool;

/// Default cache capacity: 100MB
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 100 * 1024 * 1024;

/// Default maximum number of entries (to bound LRU overhead)
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for decoded tiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileCacheKey {
    /// Stable identifier of the image source
    pub image_key: Arc<str>,

    /// Region in full-resolution image pixels
    pub src_rect: IntRect,

    /// Power-of-two downsampling factor
    pub sample_size: u32,
}

impl TileCacheKey {
    pub fn new(image_key: impl Into<Arc<str>>, src_rect: IntRect, sample_size: u32) -> Self {
        Self {
            image_key: image_key.into(),
            src_rect,
            sample_size,
        }
    }
}

// =============================================================================
// Cache Trait
// =============================================================================

/// Cache of decoded tile images shared by every image on screen.
pub trait TileImageCache: Send + Sync {
    /// Look up a cached image, marking it recently used.
    fn get(&self, key: &TileCacheKey) -> Option<Arc<TileImage>>;

    /// Store a freshly decoded image and return the shared handle to display.
    fn put(&self, key: TileCacheKey, image: TileImage, info: &ImageInfo) -> Arc<TileImage>;

    /// Pin or unpin an entry. Pins nest; displayed entries are not evicted.
    fn set_displayed(&self, key: &TileCacheKey, displayed: bool);
}

// =============================================================================
// LRU Cache
// =============================================================================

struct CacheEntry {
    image: Arc<TileImage>,
    bytes: usize,
    displayed: u32,
}

struct CacheState {
    entries: LruCache<TileCacheKey, CacheEntry>,
    current_size: usize,
}

/// LRU [`TileImageCache`] with a byte budget.
pub struct LruTileImageCache {
    state: Mutex<CacheState>,

    /// Maximum total size in bytes
    max_size: usize,

    /// Maximum number of entries
    max_entries: usize,

    pool: Option<Arc<TileImagePool>>,
}

impl LruTileImageCache {
    /// Create a cache with default capacity (100MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_CACHE_CAPACITY)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        // Bounded by trim so that pinned entries are never dropped
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                current_size: 0,
            }),
            max_size,
            max_entries: max_entries.max(1),
            pool: None,
        }
    }

    /// Send evicted images to `pool`.
    pub fn with_pool(mut self, pool: Arc<TileImagePool>) -> Self {
        self.pool = Some(pool);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Check if a tile is cached without updating LRU order.
    pub fn contains(&self, key: &TileCacheKey) -> bool {
        self.lock().entries.contains(key)
    }

    pub fn is_displayed(&self, key: &TileCacheKey) -> bool {
        self.lock()
            .entries
            .peek(key)
            .is_some_and(|entry| entry.displayed > 0)
    }

    /// Remove an entry regardless of its displayed state.
    pub fn remove(&self, key: &TileCacheKey) -> Option<Arc<TileImage>> {
        let mut state = self.lock();
        let entry = state.entries.pop(key)?;
        state.current_size = state.current_size.saturating_sub(entry.bytes);
        Some(entry.image)
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.current_size = 0;
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Current total size of cached images in bytes.
    pub fn size(&self) -> usize {
        self.lock().current_size
    }

    /// Maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Evict least-recently-used entries that are not displayed until the
    /// cache fits its byte and entry budgets or only displayed entries (and
    /// `keep`) remain.
    fn trim(&self, state: &mut CacheState, keep: Option<&TileCacheKey>) {
        while state.current_size > self.max_size || state.entries.len() > self.max_entries {
            let victim = state
                .entries
                .iter()
                .rev()
                .find(|(key, entry)| entry.displayed == 0 && Some(*key) != keep)
                .map(|(key, _)| key.clone());
            let Some(key) = victim else {
                trace!(
                    size = state.current_size,
                    capacity = self.max_size,
                    entries = state.entries.len(),
                    "Cache over budget with only displayed entries"
                );
                break;
            };
            if let Some(entry) = state.entries.pop(&key) {
                state.current_size = state.current_size.saturating_sub(entry.bytes);
                debug!(
                    rect = %key.src_rect,
                    sample_size = key.sample_size,
                    bytes = entry.bytes,
                    "Evicted tile image"
                );
                self.release(entry);
            }
        }
    }

    fn release(&self, entry: CacheEntry) {
        if let Some(pool) = &self.pool {
            if let Ok(image) = Arc::try_unwrap(entry.image) {
                pool.offer(image.size(), image);
            }
        }
    }
}

impl TileImageCache for LruTileImageCache {
    fn get(&self, key: &TileCacheKey) -> Option<Arc<TileImage>> {
        let mut state = self.lock();
        state.entries.get(key).map(|entry| entry.image.clone())
    }

    fn put(&self, key: TileCacheKey, image: TileImage, info: &ImageInfo) -> Arc<TileImage> {
        let bytes = image.byte_count();
        let image = Arc::new(image);
        let mut state = self.lock();

        // Keep the pin count of an entry being replaced
        let displayed = state.entries.peek(&key).map_or(0, |entry| entry.displayed);
        trace!(
            key = %key.image_key,
            mime_type = %info.mime_type,
            rect = %key.src_rect,
            sample_size = key.sample_size,
            bytes,
            "Caching tile image"
        );
        let entry = CacheEntry {
            image: image.clone(),
            bytes,
            displayed,
        };
        let displayed_key = key.clone();
        if let Some((_, old)) = state.entries.push(key, entry) {
            state.current_size = state.current_size.saturating_sub(old.bytes);
            self.release(old);
        }
        state.current_size += bytes;

        // The new entry is about to be displayed by the caller
        self.trim(&mut state, Some(&displayed_key));
        image
    }

    fn set_displayed(&self, key: &TileCacheKey, displayed: bool) {
        let mut state = self.lock();
        let Some(entry) = state.entries.peek_mut(key) else {
            return;
        };
        if displayed {
            entry.displayed += 1;
        } else {
            entry.displayed = entry.displayed.saturating_sub(1);
            self.trim(&mut state, None);
        }
    }
}

impl Default for LruTileImageCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
