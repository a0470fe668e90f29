//! The 2D transform applied to displayed content.
//!
//! A [`Transform`] maps a point of the content into the container in three
//! steps:
//!
//! 1. rotate the point clockwise by `rotation` degrees inside the content
//!    bounds, normalised so that the rotated content's top-left corner lands
//!    at the origin (see [`rotation_correction`]),
//! 2. multiply by `scale`,
//! 3. add `offset`.
//!
//! Base and user transforms compose with [`Transform::concat`] and are
//! separated again with [`Transform::split`].

use serde::{Deserialize, Serialize};

use crate::geometry::{normalize_rotation, IntSize, Offset, Rect, ScaleFactor, Size};

/// Scale, translation and rotation of displayed content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Per-axis scale applied after rotation
    pub scale: ScaleFactor,

    /// Translation in container pixels, applied last
    pub offset: Offset,

    /// Clockwise rotation in degrees, always a multiple of 90
    pub rotation: i32,
}

impl Transform {
    /// The identity transform.
    pub const ORIGIN: Transform = Transform {
        scale: ScaleFactor::ORIGIN,
        offset: Offset::ZERO,
        rotation: 0,
    };

    pub fn new(scale: ScaleFactor, offset: Offset, rotation: i32) -> Self {
        Self {
            scale,
            offset,
            rotation,
        }
    }

    /// Uniform scale shortcut, reading the horizontal component.
    pub fn scale_x(&self) -> f32 {
        self.scale.scale_x
    }

    /// Compose `self` (applied first) with `user` (applied second).
    ///
    /// Scales multiply, `self.offset` is scaled by the user scale before the
    /// user offset is added, rotations add.
    pub fn concat(&self, user: &Transform) -> Transform {
        Transform {
            scale: self.scale * user.scale,
            offset: self.offset * user.scale + user.offset,
            rotation: self.rotation + user.rotation,
        }
    }

    /// Inverse of [`concat`](Self::concat): recover the user part of
    /// `self` given the `base` it was composed from.
    pub fn split(&self, base: &Transform) -> Transform {
        let scale = self.scale / base.scale;
        Transform {
            scale,
            offset: self.offset - base.offset * scale,
            rotation: self.rotation - base.rotation,
        }
    }

    /// Linear interpolation between two transforms. Rotation snaps to `to`.
    pub fn lerp(from: &Transform, to: &Transform, fraction: f32) -> Transform {
        let t = fraction.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Transform {
            scale: ScaleFactor::new(
                mix(from.scale.scale_x, to.scale.scale_x),
                mix(from.scale.scale_y, to.scale.scale_y),
            ),
            offset: Offset::new(mix(from.offset.x, to.offset.x), mix(from.offset.y, to.offset.y)),
            rotation: if t >= 1.0 { to.rotation } else { from.rotation },
        }
    }

    /// Map a point of the content into the container.
    pub fn content_to_container(&self, point: Offset, content_size: IntSize) -> Offset {
        rotate_point(point, content_size, self.rotation) * self.scale + self.offset
    }

    /// Map a container point back into content coordinates.
    pub fn container_to_content(&self, point: Offset, content_size: IntSize) -> Offset {
        let rotated = (point - self.offset) / self.scale;
        reverse_rotate_point(rotated, content_size, self.rotation)
    }

    /// Map a content rectangle into the container.
    pub fn map_rect(&self, rect: Rect, content_size: IntSize) -> Rect {
        let a = self.content_to_container(rect.top_left(), content_size);
        let b = self.content_to_container(Offset::new(rect.right, rect.bottom), content_size);
        Rect::new(a.x, a.y, b.x, b.y).normalized()
    }

    /// Map a container rectangle back into content coordinates.
    pub fn reverse_map_rect(&self, rect: Rect, content_size: IntSize) -> Rect {
        let a = self.container_to_content(rect.top_left(), content_size);
        let b = self.container_to_content(Offset::new(rect.right, rect.bottom), content_size);
        Rect::new(a.x, a.y, b.x, b.y).normalized()
    }

    /// 2x3 affine matrix `[a, b, c, d, tx, ty]` for renderers, mapping a
    /// content point `(x, y)` to `(a*x + c*y + tx, b*x + d*y + ty)`.
    pub fn to_matrix(&self, content_size: IntSize) -> [f32; 6] {
        let (a, b, c, d) = match normalize_rotation(self.rotation) {
            90 => (0.0, 1.0, -1.0, 0.0),
            180 => (-1.0, 0.0, 0.0, -1.0),
            270 => (0.0, -1.0, 1.0, 0.0),
            _ => (1.0, 0.0, 0.0, 1.0),
        };
        let t = rotation_correction(content_size, self.rotation);
        let sx = self.scale.scale_x;
        let sy = self.scale.scale_y;
        [
            a * sx,
            b * sy,
            c * sx,
            d * sy,
            t.x * sx + self.offset.x,
            t.y * sy + self.offset.y,
        ]
    }

    /// Component-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Transform, tolerance: f32) -> bool {
        (self.scale.scale_x - other.scale.scale_x).abs() <= tolerance
            && (self.scale.scale_y - other.scale.scale_y).abs() <= tolerance
            && (self.offset.x - other.offset.x).abs() <= tolerance
            && (self.offset.y - other.offset.y).abs() <= tolerance
            && normalize_rotation(self.rotation) == normalize_rotation(other.rotation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::ORIGIN
    }
}

// =============================================================================
// Rotation Helpers
// =============================================================================

/// Translation that brings the clockwise-rotated content's top-left corner
/// back to the origin.
pub fn rotation_correction(content_size: IntSize, rotation: i32) -> Offset {
    let w = content_size.width as f32;
    let h = content_size.height as f32;
    match normalize_rotation(rotation) {
        90 => Offset::new(h, 0.0),
        180 => Offset::new(w, h),
        270 => Offset::new(0.0, w),
        _ => Offset::ZERO,
    }
}

/// Rotate a content point clockwise inside the content bounds.
pub fn rotate_point(point: Offset, content_size: IntSize, rotation: i32) -> Offset {
    let w = content_size.width as f32;
    let h = content_size.height as f32;
    match normalize_rotation(rotation) {
        90 => Offset::new(h - point.y, point.x),
        180 => Offset::new(w - point.x, h - point.y),
        270 => Offset::new(point.y, w - point.x),
        _ => point,
    }
}

/// Inverse of [`rotate_point`].
pub fn reverse_rotate_point(point: Offset, content_size: IntSize, rotation: i32) -> Offset {
    let w = content_size.width as f32;
    let h = content_size.height as f32;
    match normalize_rotation(rotation) {
        90 => Offset::new(point.y, h - point.x),
        180 => Offset::new(w - point.x, h - point.y),
        270 => Offset::new(w - point.y, point.x),
        _ => point,
    }
}

/// Size of the content after rotation, as floats.
pub fn rotated_size(content_size: IntSize, rotation: i32) -> Size {
    content_size.rotate(rotation).to_size()
}
