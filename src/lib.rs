//! # zoomimage
//!
//! Pan, zoom and rotate images far larger than the memory available to
//! decode them.
//!
//! The crate pairs two engines:
//!
//! - a zoom engine that tracks the scale, offset and rotation of displayed
//!   content, driven by gestures, animations and flings
//! - a subsampling engine that, for the visible region and current scale,
//!   decodes and caches only the tiles needed at the coarsest sufficient
//!   resolution
//!
//! ## Features
//!
//! - **Content scale and alignment**: fit, crop, inside, fill-bounds and friends, with RTL layouts
//! - **Read mode**: long images open filling their short side
//! - **Gestures**: rubber-band over-scroll, fling with friction, tap-to-cycle scales
//! - **Tile pyramid**: power-of-two sample sizes, prefetch margin, background tiles
//! - **Memory bounded**: byte-budgeted LRU cache with a size-keyed reuse pool
//! - **Cancellation safe**: late decode results never reach the screen
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`geometry`] - Integer and float sizes, offsets, rects and scale factors
//! - [`transform`] - Transform algebra, base transforms, scales and rect helpers
//! - [`zoom`] - Zoom state machine, animations and fling
//! - [`source`] - Image sources, region decoders and EXIF orientation
//! - [`tile`] - Tile grid, lifecycle, cache, pool and tile manager
//! - [`subsampling`] - Subsampling engine and the [`ZoomImage`] facade
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use zoomimage::{config::ZoomConfig, geometry::IntSize, ZoomableEngine};
//!
//! let mut zoom = ZoomableEngine::new(ZoomConfig::default());
//! zoom.set_container_size(IntSize::new(1080, 1920));
//! zoom.set_content_size(IntSize::new(1080, 810));
//! zoom.set_content_origin_size(IntSize::new(8000, 6000));
//!
//! zoom.scale_to(3.0, None, false, 0).unwrap();
//! assert!(zoom.scale() > 2.9);
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod source;
pub mod subsampling;
pub mod tile;
pub mod transform;
pub mod zoom;

// Re-export commonly used types
pub use config::{Cli, Command, EngineConfig, SubsamplingConfig, ZoomConfig};
pub use error::{DecodeError, SourceError, SubsamplingError, ZoomError};
pub use geometry::{IntOffset, IntRect, IntSize, Offset, Rect, ScaleFactor, Size};
pub use source::{
    DecoderBackend, DecoderFactory, ExifOrientation, ExifRegionDecoder, FileImageSource,
    ImageInfo, ImageRsDecoderFactory, ImageSource, MemoryImageSource, RegionDecoder, TileImage,
};
pub use subsampling::{Frame, SubsamplingEngine, SubsamplingEvent, ZoomImage};
pub use tile::{
    calculate_preferred_tile_size, LruTileImageCache, TileCacheKey, TileGridMap, TileImageCache,
    TileImagePool, TileManager, TileSnapshot, TileState, DEFAULT_TILE_CACHE_CAPACITY,
};
pub use transform::{Alignment, ContentScale, ReadMode, Transform};
pub use zoom::{ContinuousTransformType, Easing, Viewport, ZoomPhase, ZoomableEngine};
