//! Configuration for the zoom and subsampling engines, and the CLI.
//!
//! Library configuration is plain data with serde support so that it can be
//! loaded from JSON. The CLI is built with clap and accepts environment
//! variables with the `ZOOMIMAGE_` prefix:
//!
//! - `ZOOMIMAGE_CONFIG` - JSON file with `{ "zoom": {...}, "subsampling": {...} }`
//! - `ZOOMIMAGE_CONTAINER` - container size, e.g. `1080x1920`
//! - `ZOOMIMAGE_TILE_CACHE` - tile cache budget in bytes
//!
//! # Example
//!
//! ```
//! use zoomimage::config::{SubsamplingConfig, ZoomConfig};
//!
//! let zoom = ZoomConfig::default();
//! assert!(zoom.validate().is_ok());
//!
//! let subsampling = SubsamplingConfig {
//!     pause_when_transforming: true,
//!     ..Default::default()
//! };
//! assert!(subsampling.validate().is_ok());
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::geometry::IntSize;
use crate::tile::{DEFAULT_POOL_CAPACITY, DEFAULT_TILE_CACHE_CAPACITY};
use crate::transform::{Alignment, ContentScale, ReadMode, DEFAULT_MEDIUM_SCALE_MULTIPLE};
use crate::zoom::Easing;

// =============================================================================
// Default Values
// =============================================================================

/// Default duration of programmatic transform animations.
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 300;

/// Default duration of the tile fade-in.
pub const DEFAULT_TILE_ANIMATION_DURATION_MS: u64 = 200;

/// Default exponential decay rate of fling velocity, per second.
pub const DEFAULT_FLING_FRICTION: f32 = 4.0;

/// Default velocity below which a fling stops, in pixels per second.
pub const DEFAULT_FLING_MIN_VELOCITY: f32 = 50.0;

/// Default maximum rubber-band overshoot, as a fraction of the scale bound.
pub const DEFAULT_RUBBER_BAND_SCALE_RATIO: f32 = 0.5;

/// Default maximum rubber-band overshoot, as a fraction of the container.
pub const DEFAULT_RUBBER_BAND_OFFSET_RATIO: f32 = 0.25;

/// Default number of concurrent tile decodes.
pub const DEFAULT_DECODE_PARALLELISM: usize = 2;

/// Default prefetch margin around the visible region, in tiles.
pub const DEFAULT_PREFETCH_TILES: f32 = 0.5;

/// Default maximum number of cached tile images.
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 10_000;

/// Default container size for CLI commands.
pub const DEFAULT_CONTAINER: &str = "1080x1920";

// =============================================================================
// Zoom Configuration
// =============================================================================

/// Behavior of the zoom engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Right-to-left layout: `Start` alignments refer to the right edge.
    pub rtl: bool,

    /// Multiple between the minimum and medium scale.
    pub medium_scale_multiple: f32,

    /// Cycle through min, medium and max on double tap instead of min and medium.
    pub three_step_scale: bool,

    /// Tolerance used when picking the next step scale.
    pub step_scale_tolerance: f32,

    /// Allow damped over-zoom during gestures.
    pub rubber_band_scale: bool,

    /// Allow damped over-drag during gestures.
    pub rubber_band_offset: bool,

    /// Maximum over-zoom, as a fraction of the violated scale bound.
    pub rubber_band_scale_ratio: f32,

    /// Maximum over-drag, as a fraction of the container dimension.
    pub rubber_band_offset_ratio: f32,

    /// Initial transform override for long images.
    pub read_mode: Option<ReadMode>,

    /// Duration of animated `scale_to`/`offset_to`/`locate` and settle animations.
    pub animation_duration_ms: u64,

    /// Easing of animated transforms.
    pub easing: Easing,

    /// Exponential decay rate of fling velocity, per second.
    pub fling_friction: f32,

    /// Velocity below which a fling is not started or stops.
    pub fling_min_velocity: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            rtl: false,
            medium_scale_multiple: DEFAULT_MEDIUM_SCALE_MULTIPLE,
            three_step_scale: false,
            step_scale_tolerance: 0.1,
            rubber_band_scale: true,
            rubber_band_offset: true,
            rubber_band_scale_ratio: DEFAULT_RUBBER_BAND_SCALE_RATIO,
            rubber_band_offset_ratio: DEFAULT_RUBBER_BAND_OFFSET_RATIO,
            read_mode: None,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
            easing: Easing::default(),
            fling_friction: DEFAULT_FLING_FRICTION,
            fling_min_velocity: DEFAULT_FLING_MIN_VELOCITY,
        }
    }
}

impl ZoomConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.medium_scale_multiple > 1.0) {
            return Err("medium_scale_multiple must be greater than 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.step_scale_tolerance) {
            return Err("step_scale_tolerance must be between 0 and 1".to_string());
        }
        if !(self.rubber_band_scale_ratio > 0.0 && self.rubber_band_scale_ratio <= 1.0) {
            return Err("rubber_band_scale_ratio must be in (0, 1]".to_string());
        }
        if !(self.rubber_band_offset_ratio > 0.0 && self.rubber_band_offset_ratio <= 1.0) {
            return Err("rubber_band_offset_ratio must be in (0, 1]".to_string());
        }
        if self.animation_duration_ms > 10_000 {
            return Err("animation_duration_ms must be at most 10000".to_string());
        }
        if !(self.fling_friction > 0.0) {
            return Err("fling_friction must be greater than 0".to_string());
        }
        if self.fling_min_velocity < 0.0 {
            return Err("fling_min_velocity must not be negative".to_string());
        }
        if let Some(read_mode) = &self.read_mode {
            if read_mode.decider.same_direction_multiple < 1.0
                || read_mode.decider.not_same_direction_multiple < 1.0
            {
                return Err("read mode multiples must be at least 1".to_string());
            }
        }
        Ok(())
    }
}

// =============================================================================
// Subsampling Configuration
// =============================================================================

/// Behavior of the subsampling engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsamplingConfig {
    /// Byte budget of the default tile image cache.
    pub tile_cache_bytes: usize,

    /// Maximum number of entries in the default tile image cache.
    pub max_cache_entries: usize,

    /// Byte budget of the reuse pool.
    pub pool_bytes: usize,

    /// Number of tiles decoded concurrently.
    pub decode_parallelism: usize,

    /// Margin loaded around the visible region, in tiles.
    pub prefetch_tiles: f32,

    /// Duration of the tile fade-in.
    pub tile_animation_duration_ms: u64,

    /// Show tiles at full opacity immediately.
    pub disable_tile_animation: bool,

    /// Free tiles of other sample sizes immediately instead of keeping them
    /// until the foreground finishes loading.
    pub disable_background_tiles: bool,

    /// Skip tile refreshes while the zoom engine is animating or gesturing.
    pub pause_when_transforming: bool,
}

impl Default for SubsamplingConfig {
    fn default() -> Self {
        Self {
            tile_cache_bytes: DEFAULT_TILE_CACHE_CAPACITY,
            max_cache_entries: DEFAULT_MAX_CACHE_ENTRIES,
            pool_bytes: DEFAULT_POOL_CAPACITY,
            decode_parallelism: DEFAULT_DECODE_PARALLELISM,
            prefetch_tiles: DEFAULT_PREFETCH_TILES,
            tile_animation_duration_ms: DEFAULT_TILE_ANIMATION_DURATION_MS,
            disable_tile_animation: false,
            disable_background_tiles: false,
            pause_when_transforming: false,
        }
    }
}

impl SubsamplingConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_cache_bytes == 0 {
            return Err("tile_cache_bytes must be greater than 0".to_string());
        }
        if self.max_cache_entries == 0 {
            return Err("max_cache_entries must be greater than 0".to_string());
        }
        if self.decode_parallelism == 0 || self.decode_parallelism > 64 {
            return Err("decode_parallelism must be between 1 and 64".to_string());
        }
        if !(0.0..=4.0).contains(&self.prefetch_tiles) {
            return Err("prefetch_tiles must be between 0 and 4".to_string());
        }
        if self.tile_animation_duration_ms > 10_000 {
            return Err("tile_animation_duration_ms must be at most 10000".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Combined Configuration
// =============================================================================

/// Both engine configurations, as loaded from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub zoom: ZoomConfig,
    pub subsampling: SubsamplingConfig,
}

impl EngineConfig {
    /// Load and validate a JSON configuration file.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        let config: EngineConfig = serde_json::from_str(&text)
            .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.zoom.validate()?;
        self.subsampling.validate()
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// zoomimage - inspect huge images and plan subsampled tile pyramids.
#[derive(Parser, Debug, Clone)]
#[command(name = "zoomimage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// JSON engine configuration file.
    #[arg(long, global = true, env = "ZOOMIMAGE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Load the engine configuration named on the command line, or defaults.
    pub fn engine_config(&self) -> Result<EngineConfig, String> {
        match &self.config {
            Some(path) => EngineConfig::load_json(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print image size, mime type and EXIF orientation.
    Inspect(InspectConfig),

    /// Print the tile grid for every sample size.
    Grid(GridConfig),

    /// Zoom to a scale and decode the tiles a viewer would load.
    Simulate(SimulateConfig),
}

/// Arguments of `zoomimage inspect`.
#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    /// Image file.
    pub path: PathBuf,

    /// Output as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments of `zoomimage grid`.
#[derive(Args, Debug, Clone)]
pub struct GridConfig {
    /// Image file. Either this or `--image-size` is required.
    pub path: Option<PathBuf>,

    /// Image size as WIDTHxHEIGHT, instead of reading a file.
    #[arg(long)]
    pub image_size: Option<IntSize>,

    /// Container size as WIDTHxHEIGHT.
    #[arg(long, default_value = DEFAULT_CONTAINER, env = "ZOOMIMAGE_CONTAINER")]
    pub container: IntSize,

    /// Output as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.path.is_none() && self.image_size.is_none() {
            return Err("either an image path or --image-size is required".to_string());
        }
        if self.container.is_empty() {
            return Err("container size must not be empty".to_string());
        }
        if let Some(size) = self.image_size {
            if size.is_empty() {
                return Err("image size must not be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Arguments of `zoomimage simulate`.
#[derive(Args, Debug, Clone)]
pub struct SimulateConfig {
    /// Image file.
    pub path: PathBuf,

    /// Container size as WIDTHxHEIGHT.
    #[arg(long, default_value = DEFAULT_CONTAINER, env = "ZOOMIMAGE_CONTAINER")]
    pub container: IntSize,

    /// Target scale relative to the fitted image (1.0 = fitted).
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Content scale policy.
    #[arg(long, default_value = "fit")]
    pub content_scale: ContentScale,

    /// Content alignment.
    #[arg(long, default_value = "center")]
    pub alignment: Alignment,

    /// Rotation in degrees (multiple of 90).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub rotation: i32,

    /// Tile cache budget in bytes.
    #[arg(long, env = "ZOOMIMAGE_TILE_CACHE")]
    pub tile_cache: Option<usize>,

    /// Output as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl SimulateConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.container.is_empty() {
            return Err("container size must not be empty".to_string());
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err("scale must be a positive number".to_string());
        }
        if self.rotation % 90 != 0 {
            return Err("rotation must be a multiple of 90".to_string());
        }
        if self.tile_cache == Some(0) {
            return Err("tile cache must be greater than 0".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
