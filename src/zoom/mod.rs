//! Zoom state machine: container/content layout, user transform, gestures,
//! animations, fling and rubber banding.
//!
//! States:
//!
//! ```text
//!            gesture_start                gesture_end (out of bounds)
//!   Idle ─────────────────▶ Gesturing ─────────────────────────▶ Animating
//!    ▲  ◀─────────────────      │      gesture_end (fast release)    │
//!    │   gesture_end (in        └──────────────────────▶ Flinging ───┤
//!    │   bounds, slow)                                               │
//!    └───────────────────────── tick() finishes ◀────────────────────┘
//! ```

mod animation;
mod engine;

pub use animation::{rubber_band, Easing, FlingAnimation, TransformAnimation};
pub use engine::{ContinuousTransformType, Viewport, ZoomPhase, ZoomableEngine};
