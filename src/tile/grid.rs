//! Tile grid planning.
//!
//! For every power-of-two sample size the image is split into a grid of
//! non-overlapping source rectangles whose decoded size stays within the
//! preferred tile size:
//!
//! ```text
//!   sample 16         sample 8          sample 4 ...      sample 1
//!   ┌───────┐         ┌───┬───┐         ┌──┬──┬──┬──┐
//!   │       │         │   │   │         ├──┼──┼──┼──┤     (15 x 9 for an
//!   │       │         ├───┼───┤         ├──┼──┼──┼──┤      8000x8000 image
//!   └───────┘         └───┴───┘         └──┴──┴──┴──┘      and 540x960 tiles)
//! ```
//!
//! Levels are generated from sample size 1 upward until a single tile covers
//! the whole image. The grid depends only on the image size and the preferred
//! tile size and is immutable once built.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{IntRect, IntSize};

/// Upper bound on the sample size, to stop runaway loops on degenerate input.
const MAX_SAMPLE_SIZE: u32 = 1 << 16;

/// Position of a tile within its level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoordinate {
    pub col: u32,
    pub row: u32,
}

impl TileCoordinate {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

/// One planned tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSpec {
    pub coordinate: TileCoordinate,
    /// Rectangle in full-resolution image pixels
    pub src_rect: IntRect,
    pub sample_size: u32,
}

impl TileSpec {
    /// Nominal decoded size: `ceil(src / sample_size)` on each axis.
    pub fn decoded_size(&self) -> IntSize {
        decoded_size(self.src_rect, self.sample_size)
    }
}

/// Nominal decoded size of `src_rect` at `sample_size`.
pub fn decoded_size(src_rect: IntRect, sample_size: u32) -> IntSize {
    let s = sample_size.max(1);
    IntSize::new(
        (src_rect.width().max(0) as u32).div_ceil(s),
        (src_rect.height().max(0) as u32).div_ceil(s),
    )
}

/// All tiles of one sample size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGridLevel {
    pub sample_size: u32,
    pub columns: u32,
    pub rows: u32,
    /// Source size of a full (non-edge) tile
    pub tile_src_size: IntSize,
    /// Row-major tiles
    pub tiles: Vec<TileSpec>,
}

impl TileGridLevel {
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Indexes of tiles intersecting `rect` (image pixels).
    pub fn intersecting(&self, rect: &IntRect) -> Vec<usize> {
        if rect.is_empty() {
            return Vec::new();
        }
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, spec)| spec.src_rect.overlaps(rect))
            .map(|(index, _)| index)
            .collect()
    }
}

/// Grids for every sample size of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGridMap {
    pub image_size: IntSize,
    pub preferred_tile_size: IntSize,
    levels: BTreeMap<u32, TileGridLevel>,
}

impl TileGridMap {
    /// Plan the grids. Empty sizes produce an empty map.
    pub fn new(image_size: IntSize, preferred_tile_size: IntSize) -> Self {
        let mut levels = BTreeMap::new();
        if !image_size.is_empty() && !preferred_tile_size.is_empty() {
            let mut sample_size = 1u32;
            loop {
                let level = build_level(image_size, preferred_tile_size, sample_size);
                let single = level.columns == 1 && level.rows == 1;
                levels.insert(sample_size, level);
                if single || sample_size >= MAX_SAMPLE_SIZE {
                    break;
                }
                sample_size *= 2;
            }
        }
        Self {
            image_size,
            preferred_tile_size,
            levels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, sample_size: u32) -> Option<&TileGridLevel> {
        self.levels.get(&sample_size)
    }

    /// Levels from the coarsest sample size down to 1.
    pub fn levels(&self) -> impl Iterator<Item = &TileGridLevel> {
        self.levels.values().rev()
    }

    /// Largest sample size, whose level is a single tile.
    pub fn max_sample_size(&self) -> u32 {
        self.levels.keys().next_back().copied().unwrap_or(1)
    }

    /// Compact description, e.g. `16:1x1, 8:2x2, 4:4x3, 2:8x5, 1:15x9`.
    pub fn describe(&self) -> String {
        self.levels()
            .map(|level| format!("{}:{}x{}", level.sample_size, level.columns, level.rows))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn build_level(image_size: IntSize, tile_size: IntSize, sample_size: u32) -> TileGridLevel {
    let (columns, tile_width) = split_axis(image_size.width, tile_size.width, sample_size);
    let (rows, tile_height) = split_axis(image_size.height, tile_size.height, sample_size);

    let mut tiles = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        let top = row * tile_height;
        let bottom = (top + tile_height).min(image_size.height);
        for col in 0..columns {
            let left = col * tile_width;
            let right = (left + tile_width).min(image_size.width);
            tiles.push(TileSpec {
                coordinate: TileCoordinate::new(col, row),
                src_rect: IntRect::new(left as i32, top as i32, right as i32, bottom as i32),
                sample_size,
            });
        }
    }
    TileGridLevel {
        sample_size,
        columns,
        rows,
        tile_src_size: IntSize::new(tile_width, tile_height),
        tiles,
    }
}

/// Split one axis into evenly sized tiles of at most `tile * sample_size`
/// source pixels. Returns the tile count and the source size of each tile.
fn split_axis(length: u32, tile: u32, sample_size: u32) -> (u32, u32) {
    let max_src = (tile as u64 * sample_size as u64).max(1);
    let count = (length as u64).div_ceil(max_src).max(1);
    let size = (length as u64).div_ceil(count);
    // Recount so that no trailing tile is empty
    let count = (length as u64).div_ceil(size);
    (count as u32, size as u32)
}

/// Preferred decoded tile size for a container: half of it on each axis.
pub fn calculate_preferred_tile_size(container_size: IntSize) -> IntSize {
    IntSize::new(
        (container_size.width / 2).max(1),
        (container_size.height / 2).max(1),
    )
}

/// Sample size for drawing content of `content_size` at `scale`.
///
/// Picks the smallest power of two whose decoded image does not exceed the
/// displayed pixel size, so the ideal size rounds to the coarser level.
/// Clamped to `[1, max_sample_size]`.
pub fn find_sample_size(image_size: IntSize, content_size: IntSize, scale: f32, max_sample_size: u32) -> u32 {
    if image_size.is_empty() || content_size.is_empty() || !(scale.is_finite() && scale > 0.0) {
        return 1;
    }
    let ratio = sampling_ratio(image_size, content_size, scale);
    let max = max_sample_size.max(1);
    let mut sample_size = 1u32;
    while (sample_size as f32) < ratio - 1.0e-3 && sample_size < max {
        sample_size *= 2;
    }
    sample_size
}

/// Image pixels per displayed pixel on the denser axis.
fn sampling_ratio(image_size: IntSize, content_size: IntSize, scale: f32) -> f32 {
    let width = image_size.width as f32 / (content_size.width as f32 * scale);
    let height = image_size.height as f32 / (content_size.height as f32 * scale);
    width.max(height)
}

/// True when tiles at `sample_size` would not be sharper than the content
/// already displayed.
pub fn preview_suffices(image_size: IntSize, content_size: IntSize, sample_size: u32) -> bool {
    if content_size.is_empty() {
        return false;
    }
    sample_size as f32 >= sampling_ratio(image_size, content_size, 1.0) - 1.0e-3
}
