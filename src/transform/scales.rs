//! Support scales (`min`, `medium`, `max`) and tap-to-cycle step selection.
//!
//! All scales here are *final* scales: the factor between content pixels
//! and container pixels after base and user transforms are combined.

use crate::geometry::{IntSize, ScaleFactor};

use super::content_scale::ContentScale;

/// Default multiple between the minimum and medium scale.
pub const DEFAULT_MEDIUM_SCALE_MULTIPLE: f32 = 3.0;

/// Ratio between the medium and maximum scale.
pub const MAX_SCALE_MULTIPLE: f32 = 2.0;

/// Derive `[min, medium, max]` scales.
///
/// - `min` is the base scale: the content exactly fits per `content_scale`.
/// - `medium` is the largest of: the scale showing the original image at
///   1:1 pixels, the scale filling the container, and `min * multiple`.
/// - `max` is twice `medium`.
///
/// With `FillBounds`, or when the base scale is not uniform, a single
/// "fill" scale is undefined, so three geometric steps of `multiple` are
/// returned instead.
pub fn compute_support_scales(
    container_size: IntSize,
    content_size: IntSize,
    content_origin_size: IntSize,
    content_scale: ContentScale,
    rotation: i32,
    base_scale: ScaleFactor,
    multiple: f32,
) -> [f32; 3] {
    let min_scale = base_scale.scale_x;
    if container_size.is_empty() || content_size.is_empty() {
        return [min_scale; 3];
    }
    if content_scale == ContentScale::FillBounds || !base_scale.is_uniform() {
        return [min_scale, min_scale * multiple, min_scale * multiple * multiple];
    }

    let rotated = content_size.rotate(rotation).to_size();
    let container = container_size.to_size();
    let fill_container_scale =
        (container.width / rotated.width).max(container.height / rotated.height);
    let content_origin_scale = if content_origin_size.is_empty() {
        1.0
    } else {
        (content_origin_size.width as f32 / content_size.width as f32)
            .max(content_origin_size.height as f32 / content_size.height as f32)
    };
    let medium_scale = content_origin_scale
        .max(fill_container_scale)
        .max(min_scale * multiple);
    [min_scale, medium_scale, medium_scale * MAX_SCALE_MULTIPLE]
}

/// Next scale when cycling through `step_scales`.
///
/// Returns the smallest step strictly greater than `current_scale + tolerance`,
/// wrapping to the first step once the last one is reached.
pub fn calculate_next_step_scale(step_scales: &[f32], current_scale: f32, tolerance: f32) -> f32 {
    let mut steps = step_scales.to_vec();
    steps.sort_by(|a, b| a.total_cmp(b));
    let Some(&first) = steps.first() else {
        return current_scale;
    };
    steps
        .into_iter()
        .find(|&step| step > current_scale + tolerance)
        .unwrap_or(first)
}
