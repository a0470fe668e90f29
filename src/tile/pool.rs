//! Reuse pool for decoded tile images.
//!
//! Images evicted from the cache, or decoded for tiles that went away, are
//! parked here by slot size and handed back to the decoder for the next tile
//! of that size.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{trace, warn};

use crate::geometry::IntSize;
use crate::source::TileImage;

/// Default pool capacity: 32MB
pub const DEFAULT_POOL_CAPACITY: usize = 32 * 1024 * 1024;

#[derive(Default)]
struct PoolState {
    slots: HashMap<IntSize, Vec<TileImage>>,
    current_size: usize,
}

/// Size-keyed pool of reusable tile images with a byte budget.
pub struct TileImagePool {
    state: Mutex<PoolState>,
    max_size: usize,
}

impl TileImagePool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            max_size,
        }
    }

    /// Park `image` under `slot`.
    ///
    /// The image is discarded when its size differs from the slot, when its
    /// pixels are gone, or when the pool is full. Returns whether it was kept.
    pub fn offer(&self, slot: IntSize, image: TileImage) -> bool {
        if image.size() != slot {
            warn!(
                slot = %slot,
                image = %image.size(),
                "Discarding pooled image with mismatched size"
            );
            return false;
        }
        let bytes = image.byte_count();
        if bytes == 0 {
            return false;
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.current_size + bytes > self.max_size {
            trace!(slot = %slot, bytes, "Pool full, dropping image");
            return false;
        }
        state.current_size += bytes;
        state.slots.entry(slot).or_default().push(image);
        true
    }

    /// Take an image of exactly `slot` size, if one is parked.
    pub fn take(&self, slot: IntSize) -> Option<TileImage> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let image = state.slots.get_mut(&slot)?.pop()?;
        state.current_size = state.current_size.saturating_sub(image.byte_count());
        Some(image)
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.slots.clear();
        state.current_size = 0;
    }

    /// Number of parked images.
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.slots.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes held by parked images.
    pub fn size(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).current_size
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for TileImagePool {
    fn default() -> Self {
        Self::new()
    }
}
