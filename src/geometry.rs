//! Geometry value types shared by the zoom and subsampling engines.
//!
//! Integer variants (`IntSize`, `IntOffset`, `IntRect`) address pixels exactly
//! and are used for image sizes and tile source rectangles. Float variants
//! (`Size`, `Offset`, `Rect`, `ScaleFactor`) carry sub-pixel transform math.
//!
//! All rectangles are stored as `left/top/right/bottom` edges. A rectangle is
//! empty when `right <= left` or `bottom <= top`.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Integer Types
// =============================================================================

/// Pixel-exact size. Width and height are never negative.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntSize {
    pub width: u32,
    pub height: u32,
}

impl IntSize {
    pub const ZERO: IntSize = IntSize {
        width: 0,
        height: 0,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Swap width and height when `rotation` is 90 or 270 degrees.
    pub fn rotate(&self, rotation: i32) -> Self {
        if is_quarter_turn(rotation) {
            Self::new(self.height, self.width)
        } else {
            *self
        }
    }

    pub fn to_size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    pub fn to_rect(&self) -> IntRect {
        IntRect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Width divided by height, `0.0` for an empty size.
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl fmt::Display for IntSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for IntSize {
    type Err = String;

    /// Parse `"WIDTHxHEIGHT"`, e.g. `"1080x1920"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid width '{}': {}", w, e))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid height '{}': {}", h, e))?;
        Ok(Self::new(width, height))
    }
}

/// Pixel-exact offset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntOffset {
    pub x: i32,
    pub y: i32,
}

impl IntOffset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pixel-exact rectangle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl IntRect {
    pub const ZERO: IntRect = IntRect {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn size(&self) -> IntSize {
        IntSize::new(self.width().max(0) as u32, self.height().max(0) as u32)
    }

    pub const fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// True when the two rectangles share a non-empty area.
    pub fn overlaps(&self, other: &IntRect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &IntRect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Intersection of two rectangles, `None` when they do not overlap.
    pub fn intersect(&self, other: &IntRect) -> Option<IntRect> {
        let rect = IntRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (!rect.is_empty()).then_some(rect)
    }

    /// Grow every edge outward by the given amounts.
    pub fn inflate(&self, dx: i32, dy: i32) -> IntRect {
        IntRect::new(
            self.left - dx,
            self.top - dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Clamp the rectangle into `bounds`. The result may be empty.
    pub fn clamp_to(&self, bounds: &IntRect) -> IntRect {
        IntRect::new(
            self.left.clamp(bounds.left, bounds.right),
            self.top.clamp(bounds.top, bounds.bottom),
            self.right.clamp(bounds.left, bounds.right),
            self.bottom.clamp(bounds.top, bounds.bottom),
        )
    }

    pub fn center(&self) -> Offset {
        Offset::new(
            (self.left + self.right) as f32 / 2.0,
            (self.top + self.bottom) as f32 / 2.0,
        )
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.left as f32,
            self.top as f32,
            self.right as f32,
            self.bottom as f32,
        )
    }
}

impl fmt::Display for IntRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{},{},{}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

// =============================================================================
// Float Types
// =============================================================================

/// Sub-pixel size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn rotate(&self, rotation: i32) -> Self {
        if is_quarter_turn(rotation) {
            Self::new(self.height, self.width)
        } else {
            *self
        }
    }

    /// Rounded to the nearest integer size.
    pub fn round(&self) -> IntSize {
        IntSize::new(
            self.width.max(0.0).round() as u32,
            self.height.max(0.0).round() as u32,
        )
    }
}

impl Mul<ScaleFactor> for Size {
    type Output = Size;

    fn mul(self, rhs: ScaleFactor) -> Size {
        Size::new(self.width * rhs.scale_x, self.height * rhs.scale_y)
    }
}

/// Sub-pixel offset or point.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn distance(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn round(&self) -> IntOffset {
        IntOffset::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Offset {
    type Output = Offset;

    fn mul(self, rhs: f32) -> Offset {
        Offset::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<ScaleFactor> for Offset {
    type Output = Offset;

    fn mul(self, rhs: ScaleFactor) -> Offset {
        Offset::new(self.x * rhs.scale_x, self.y * rhs.scale_y)
    }
}

impl Div<ScaleFactor> for Offset {
    type Output = Offset;

    fn div(self, rhs: ScaleFactor) -> Offset {
        Offset::new(self.x / rhs.scale_x, self.y / rhs.scale_y)
    }
}

/// Sub-pixel rectangle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_offset_size(offset: Offset, size: Size) -> Self {
        Self::new(
            offset.x,
            offset.y,
            offset.x + size.width,
            offset.y + size.height,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn top_left(&self) -> Offset {
        Offset::new(self.left, self.top)
    }

    pub fn center(&self) -> Offset {
        Offset::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let rect = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (!rect.is_empty()).then_some(rect)
    }

    pub fn translate(&self, offset: Offset) -> Rect {
        Rect::new(
            self.left + offset.x,
            self.top + offset.y,
            self.right + offset.x,
            self.bottom + offset.y,
        )
    }

    pub fn scale(&self, scale: ScaleFactor) -> Rect {
        Rect::new(
            self.left * scale.scale_x,
            self.top * scale.scale_y,
            self.right * scale.scale_x,
            self.bottom * scale.scale_y,
        )
    }

    /// Normalised so that `left <= right` and `top <= bottom`.
    pub fn normalized(&self) -> Rect {
        Rect::new(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }

    /// Rounded edge by edge.
    pub fn round(&self) -> IntRect {
        IntRect::new(
            self.left.round() as i32,
            self.top.round() as i32,
            self.right.round() as i32,
            self.bottom.round() as i32,
        )
    }

    /// Smallest integer rectangle containing this one.
    pub fn round_out(&self) -> IntRect {
        IntRect::new(
            self.left.floor() as i32,
            self.top.floor() as i32,
            self.right.ceil() as i32,
            self.bottom.ceil() as i32,
        )
    }
}

/// Independent horizontal and vertical scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactor {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl ScaleFactor {
    pub const ORIGIN: ScaleFactor = ScaleFactor {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub const fn new(scale_x: f32, scale_y: f32) -> Self {
        Self { scale_x, scale_y }
    }

    pub const fn uniform(scale: f32) -> Self {
        Self::new(scale, scale)
    }

    pub fn is_uniform(&self) -> bool {
        approx_eq(self.scale_x, self.scale_y, 1.0e-4)
    }

    pub fn is_valid(&self) -> bool {
        self.scale_x.is_finite()
            && self.scale_y.is_finite()
            && self.scale_x > 0.0
            && self.scale_y > 0.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl Mul for ScaleFactor {
    type Output = ScaleFactor;

    fn mul(self, rhs: ScaleFactor) -> ScaleFactor {
        ScaleFactor::new(self.scale_x * rhs.scale_x, self.scale_y * rhs.scale_y)
    }
}

impl Div for ScaleFactor {
    type Output = ScaleFactor;

    fn div(self, rhs: ScaleFactor) -> ScaleFactor {
        ScaleFactor::new(self.scale_x / rhs.scale_x, self.scale_y / rhs.scale_y)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Floating point comparison with absolute tolerance.
#[inline]
pub fn approx_eq(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}

/// True for rotations that swap axes (90 and 270 degrees, any sign).
#[inline]
pub fn is_quarter_turn(rotation: i32) -> bool {
    rotation.rem_euclid(180) == 90
}

/// Normalise a multiple-of-90 rotation into `0..360`.
#[inline]
pub fn normalize_rotation(rotation: i32) -> i32 {
    rotation.rem_euclid(360)
}
