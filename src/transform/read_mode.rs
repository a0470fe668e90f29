//! Read mode for long images.
//!
//! Images whose aspect ratio is extreme relative to the container (long comic
//! strips, panoramas) open pre-zoomed so that they fill the container along
//! the dominant axis instead of fitting entirely.

use serde::{Deserialize, Serialize};

use crate::geometry::{IntSize, Offset, ScaleFactor, Size};

use super::affine::Transform;

/// Default aspect-ratio multiple for long images oriented like the container.
pub const DEFAULT_SAME_DIRECTION_MULTIPLE: f32 = 2.5;

/// Default aspect-ratio multiple for long images oriented against the container.
pub const DEFAULT_NOT_SAME_DIRECTION_MULTIPLE: f32 = 5.0;

/// Which long-image directions read mode applies to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadModeSizeType {
    /// Only images wider than the container's aspect ratio
    Horizontal,
    /// Only images taller than the container's aspect ratio
    Vertical,
    #[default]
    Both,
}

/// Decides whether an image counts as "long" for a given container.
///
/// Aspect ratios are compared as `max / min`. When image and container share
/// an orientation (both landscape or both portrait) the ratio must reach
/// `same_direction_multiple`, otherwise `not_same_direction_multiple`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongImageDecider {
    pub same_direction_multiple: f32,
    pub not_same_direction_multiple: f32,
}

impl Default for LongImageDecider {
    fn default() -> Self {
        Self {
            same_direction_multiple: DEFAULT_SAME_DIRECTION_MULTIPLE,
            not_same_direction_multiple: DEFAULT_NOT_SAME_DIRECTION_MULTIPLE,
        }
    }
}

impl LongImageDecider {
    pub fn is_long_image(&self, src_size: IntSize, dst_size: IntSize) -> bool {
        if src_size.is_empty() || dst_size.is_empty() {
            return false;
        }
        let src_ratio = round2(src_size.aspect_ratio());
        let dst_ratio = round2(dst_size.aspect_ratio());
        let same_direction = src_ratio == 1.0
            || dst_ratio == 1.0
            || (src_ratio > 1.0 && dst_ratio > 1.0)
            || (src_ratio < 1.0 && dst_ratio < 1.0);
        let multiple = src_ratio.max(dst_ratio) / src_ratio.min(dst_ratio);
        if same_direction {
            multiple >= self.same_direction_multiple
        } else {
            multiple >= self.not_same_direction_multiple
        }
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Read mode settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadMode {
    pub size_type: ReadModeSizeType,
    pub decider: LongImageDecider,
}

impl ReadMode {
    /// True when read mode applies to content of `src_size` (already rotated)
    /// shown in a container of `dst_size`.
    pub fn accept(&self, src_size: IntSize, dst_size: IntSize) -> bool {
        if !self.decider.is_long_image(src_size, dst_size) {
            return false;
        }
        let horizontal = src_size.aspect_ratio() > dst_size.aspect_ratio();
        match self.size_type {
            ReadModeSizeType::Both => true,
            ReadModeSizeType::Horizontal => horizontal,
            ReadModeSizeType::Vertical => !horizontal,
        }
    }
}

/// User transform that fills `dst_size` along the dominant axis.
///
/// The combined scale becomes `max(dst.w / src.w, dst.h / src.h)` and the
/// combined offset is zero, so reading starts at the top-left edge. `src_size`
/// is the rotated content size.
pub fn compute_read_mode_transform(src_size: Size, dst_size: Size, base: &Transform) -> Transform {
    if src_size.is_empty() || dst_size.is_empty() || !base.scale.is_valid() {
        return Transform::ORIGIN;
    }
    let fill_scale = (dst_size.width / src_size.width).max(dst_size.height / src_size.height);
    let user_scale = ScaleFactor::new(
        fill_scale / base.scale.scale_x,
        fill_scale / base.scale.scale_y,
    );
    let offset = Offset::new(
        -base.offset.x * user_scale.scale_x,
        -base.offset.y * user_scale.scale_y,
    );
    Transform::new(user_scale, offset, 0)
}
