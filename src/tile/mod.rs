//! Tile layer.
//!
//! This module plans, loads and caches the tiles that draw a large image at
//! full sharpness while it is zoomed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           SubsamplingEngine             │
//! └────────────────────┬────────────────────┘
//!                      │ refresh(viewport)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              TileManager                │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ TileGridMap  │  │  Tile (state,   │  │
//! │  │ (levels per  │  │   image, fade)  │  │
//! │  │ sample size) │  │                 │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └──────────┬─────────────────────┬────────┘
//!            │                     │
//!            ▼                     ▼
//! ┌────────────────────┐  ┌─────────────────┐
//! │ LruTileImageCache  │─►│  TileImagePool  │
//! │ (shared, budgeted) │  │ (reuse by size) │
//! └────────────────────┘  └─────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileGridMap`]: Non-overlapping tile grids for every power-of-two sample size
//! - [`TileManager`]: Loads visible tiles, frees the rest, keeps background tiles
//! - [`Tile`]: One grid cell with its load state, image and fade-in
//! - [`LruTileImageCache`]: Byte-budgeted LRU cache that never evicts displayed tiles
//! - [`TileImagePool`]: Size-keyed pool handing evicted images back to decoders
//!
//! # Example
//!
//! ```
//! use zoomimage::geometry::IntSize;
//! use zoomimage::tile::{calculate_preferred_tile_size, TileGridMap};
//!
//! let tile_size = calculate_preferred_tile_size(IntSize::new(1080, 1920));
//! let grid = TileGridMap::new(IntSize::new(8000, 8000), tile_size);
//! assert_eq!(grid.describe(), "16:1x1, 8:2x2, 4:4x3, 2:8x5, 1:15x9");
//! ```

mod animation;
mod cache;
mod grid;
mod manager;
mod pool;
#[allow(clippy::module_inception)]
mod tile;

pub use animation::TileAnimationState;
pub use cache::{
    LruTileImageCache, TileCacheKey, TileImageCache, DEFAULT_MAX_ENTRIES,
    DEFAULT_TILE_CACHE_CAPACITY,
};
pub use grid::{
    calculate_preferred_tile_size, decoded_size, find_sample_size, preview_suffices,
    TileCoordinate, TileGridLevel, TileGridMap, TileSpec,
};
pub use manager::{TileCounts, TileEvent, TileManager, TileSnapshot};
pub use pool::{TileImagePool, DEFAULT_POOL_CAPACITY};
pub use tile::{Tile, TileState};
