//! Time-based animations driven by explicit frame ticks.
//!
//! Nothing here owns a clock: every function takes the current time in
//! milliseconds, so the caller decides when frames happen and tests stay
//! deterministic.

use serde::{Deserialize, Serialize};

use crate::geometry::{Offset, Rect};
use crate::transform::Transform;

// =============================================================================
// Easing
// =============================================================================

/// Progress curve of transform animations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Cubic bezier (0.4, 0, 0.2, 1)
    #[default]
    FastOutSlowIn,
    /// Cubic bezier (0, 0, 0.2, 1)
    LinearOutSlowIn,
    /// Cubic bezier (0.4, 0, 1, 1)
    FastOutLinearIn,
    /// Arbitrary cubic bezier with control points (x1, y1) and (x2, y2)
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Easing {
    /// Map linear progress in `[0, 1]` to eased progress.
    pub fn transform(&self, fraction: f32) -> f32 {
        let t = fraction.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
            Easing::LinearOutSlowIn => cubic_bezier(0.0, 0.0, 0.2, 1.0, t),
            Easing::FastOutLinearIn => cubic_bezier(0.4, 0.0, 1.0, 1.0, t),
            Easing::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

/// Evaluate a CSS-style cubic bezier timing curve at `x`.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let curve = |a: f32, b: f32, t: f32| {
        let u = 1.0 - t;
        3.0 * u * u * t * a + 3.0 * u * t * t * b + t * t * t
    };
    let slope = |a: f32, b: f32, t: f32| {
        let u = 1.0 - t;
        3.0 * u * u * a + 6.0 * u * t * (b - a) + 3.0 * t * t * (1.0 - b)
    };

    // Newton iterations, falling back to bisection on flat slopes
    let mut t = x;
    for _ in 0..8 {
        let error = curve(x1, x2, t) - x;
        if error.abs() < 1.0e-5 {
            return curve(y1, y2, t);
        }
        let d = slope(x1, x2, t);
        if d.abs() < 1.0e-6 {
            break;
        }
        t = (t - error / d).clamp(0.0, 1.0);
    }
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    t = x;
    for _ in 0..32 {
        let value = curve(x1, x2, t);
        if (value - x).abs() < 1.0e-5 {
            break;
        }
        if value < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    curve(y1, y2, t)
}

// =============================================================================
// Transform Animation
// =============================================================================

/// Interpolation between two user transforms over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformAnimation {
    pub from: Transform,
    pub to: Transform,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl TransformAnimation {
    pub fn new(from: Transform, to: Transform, start_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
            easing,
        }
    }

    /// Transform at `now_ms` and whether the animation has finished.
    ///
    /// The final frame returns `to` exactly.
    pub fn value_at(&self, now_ms: u64) -> (Transform, bool) {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        if self.duration_ms == 0 || elapsed >= self.duration_ms {
            return (self.to, true);
        }
        let fraction = elapsed as f32 / self.duration_ms as f32;
        let eased = self.easing.transform(fraction);
        (Transform::lerp(&self.from, &self.to, eased), false)
    }
}

// =============================================================================
// Fling
// =============================================================================

/// Inertial pan with exponential velocity decay, confined to offset bounds.
///
/// Velocity decays as `v0 * e^(-friction * t)`, so the travelled distance
/// converges to `v0 / friction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingAnimation {
    pub start: Offset,
    /// Initial velocity in pixels per second
    pub velocity: Offset,
    pub start_ms: u64,
    /// Decay rate per second
    pub friction: f32,
    /// Speed below which the fling stops
    pub min_velocity: f32,
    pub bounds: Rect,
}

impl FlingAnimation {
    /// Offset at `now_ms` and whether the fling has stopped.
    pub fn value_at(&self, now_ms: u64) -> (Offset, bool) {
        let t = now_ms.saturating_sub(self.start_ms) as f32 / 1000.0;
        let decay = (-self.friction * t).exp();
        let travelled = (1.0 - decay) / self.friction;
        let raw = self.start + self.velocity * travelled;

        let x = raw.x.clamp(self.bounds.left, self.bounds.right);
        let y = raw.y.clamp(self.bounds.top, self.bounds.bottom);
        let blocked_x = x != raw.x || self.velocity.x == 0.0;
        let blocked_y = y != raw.y || self.velocity.y == 0.0;

        let speed = self.velocity.distance() * decay;
        let finished = speed < self.min_velocity || (blocked_x && blocked_y);
        (Offset::new(x, y), finished)
    }
}

// =============================================================================
// Rubber Band
// =============================================================================

/// Damp `value` outside `[min, max]`.
///
/// Overshoot `e` becomes `e / (1 + e / limit)`: close to `e` for small
/// overshoots and never more than `limit`.
pub fn rubber_band(value: f32, min: f32, max: f32, limit: f32) -> f32 {
    if limit <= 0.0 {
        return value.clamp(min, max);
    }
    if value > max {
        let e = value - max;
        max + e / (1.0 + e / limit)
    } else if value < min {
        let e = min - value;
        min - e / (1.0 + e / limit)
    } else {
        value
    }
}
