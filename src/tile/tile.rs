use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::geometry::{IntRect, IntSize};
use crate::source::TileImage;

use super::animation::TileAnimationState;
use super::grid::{TileCoordinate, TileSpec};

/// Load state of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileState {
    Absent,
    Loading,
    Loaded,
    Failed,
}

impl fmt::Display for TileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TileState::Absent => "absent",
            TileState::Loading => "loading",
            TileState::Loaded => "loaded",
            TileState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One cell of a tile grid level and the image decoded for it.
#[derive(Debug, Clone)]
pub struct Tile {
    spec: TileSpec,
    state: TileState,
    image: Option<Arc<TileImage>>,
    animation: TileAnimationState,
}

impl Tile {
    pub fn new(spec: TileSpec, animation_duration_ms: u64) -> Self {
        Self {
            spec,
            state: TileState::Absent,
            image: None,
            animation: TileAnimationState::new(animation_duration_ms),
        }
    }

    pub fn spec(&self) -> &TileSpec {
        &self.spec
    }

    pub fn coordinate(&self) -> TileCoordinate {
        self.spec.coordinate
    }

    pub fn src_rect(&self) -> IntRect {
        self.spec.src_rect
    }

    pub fn sample_size(&self) -> u32 {
        self.spec.sample_size
    }

    pub fn decoded_size(&self) -> IntSize {
        self.spec.decoded_size()
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn set_state(&mut self, state: TileState) {
        self.state = state;
    }

    pub fn image(&self) -> Option<&Arc<TileImage>> {
        self.image.as_ref()
    }

    /// Attach an image and mark the tile loaded, or detach it and mark the
    /// tile absent. Returns the previous image so the caller can release it.
    pub fn set_image(
        &mut self,
        image: Option<Arc<TileImage>>,
        animate: bool,
        now_ms: u64,
    ) -> Option<Arc<TileImage>> {
        match &image {
            Some(_) => {
                self.state = TileState::Loaded;
                if animate {
                    self.animation.start(now_ms);
                } else {
                    self.animation.skip();
                }
            }
            None => {
                self.state = TileState::Absent;
                self.animation.skip();
            }
        }
        std::mem::replace(&mut self.image, image)
    }

    /// Current alpha, advancing the fade-in to `now_ms`.
    pub fn alpha(&mut self, now_ms: u64) -> u8 {
        self.animation.calculate(now_ms)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }
}
