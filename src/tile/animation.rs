//! Fade-in of newly loaded tiles.

use serde::Serialize;

pub const OPAQUE: u8 = 255;

/// Alpha ramp from 0 to 255 over a fixed duration.
///
/// `calculate` is monotonic in time and idempotent for a given instant, so
/// a renderer may query it any number of times per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileAnimationState {
    duration_ms: u64,
    start_ms: Option<u64>,
    alpha: u8,
}

impl TileAnimationState {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            start_ms: None,
            alpha: OPAQUE,
        }
    }

    /// Begin fading in at `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        if self.duration_ms == 0 {
            self.skip();
            return;
        }
        self.start_ms = Some(now_ms);
        self.alpha = 0;
    }

    /// Jump to fully opaque.
    pub fn skip(&mut self) {
        self.start_ms = None;
        self.alpha = OPAQUE;
    }

    pub fn is_running(&self) -> bool {
        self.start_ms.is_some()
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Advance to `now_ms` and return the alpha.
    pub fn calculate(&mut self, now_ms: u64) -> u8 {
        let Some(start) = self.start_ms else {
            return self.alpha;
        };
        let elapsed = now_ms.saturating_sub(start);
        if elapsed >= self.duration_ms {
            self.skip();
            return OPAQUE;
        }
        let alpha = (elapsed as f64 / self.duration_ms as f64 * OPAQUE as f64) as u8;
        // Clock going backwards must not fade the tile out again
        self.alpha = self.alpha.max(alpha);
        self.alpha
    }
}

impl Default for TileAnimationState {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TILE_ANIMATION_DURATION_MS)
    }
}
