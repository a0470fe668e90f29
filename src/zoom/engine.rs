//! The zoom state machine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         ZoomableEngine                           │
//! │                                                                  │
//! │  layout inputs            base transform       user transform    │
//! │  container, content  ──▶  resolve_base   ──▶  scale_to/offset_to │
//! │  scale, alignment,        support scales      gestures, fling,   │
//! │  rotation                 offset bounds       rubber band        │
//! │                                                                  │
//! │  transform() = base.concat(user)     tick(now) advances          │
//! │  viewport()  = snapshot for subsampling and rendering            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine has a single owner and no interior mutability. Animations do
//! not run on their own: the owner calls [`ZoomableEngine::tick`] once per
//! frame with the current time, and every operation taking `now_ms` uses the
//! same clock.
//!
//! The user transform never carries rotation and always has a uniform scale.
//! Rotation lives in the base transform.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ZoomConfig;
use crate::error::ZoomError;
use crate::geometry::{normalize_rotation, IntSize, Offset, Rect, ScaleFactor};
use crate::transform::{
    calculate_content_display_rect, calculate_content_visible_rect, calculate_next_step_scale,
    calculate_scroll_edge, calculate_user_offset_bounds, clamp_offset, compute_read_mode_transform,
    compute_support_scales, resolve_base_transform, Alignment, ContentScale, ReadMode, ScrollEdge,
    Transform,
};

use super::animation::{rubber_band, FlingAnimation, TransformAnimation};

/// Tolerance when comparing user transforms.
const TRANSFORM_TOLERANCE: f32 = 1.0e-3;

// =============================================================================
// Public State Types
// =============================================================================

/// Kind of transform change currently in progress.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuousTransformType {
    #[default]
    None,
    Scale,
    Offset,
    Locate,
    Gesture,
    Fling,
}

/// Coarse engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomPhase {
    Idle,
    Animating,
    Gesturing,
}

/// Read-only snapshot of what the engine currently shows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub container_size: IntSize,
    pub content_size: IntSize,
    pub content_origin_size: IntSize,
    /// Combined base and user transform
    pub transform: Transform,
    /// Visible part of the content, in content coordinates
    pub content_visible_rect: Rect,
    pub continuous_transform_type: ContinuousTransformType,
}

impl Viewport {
    /// True when both container and content have a size.
    pub fn is_ready(&self) -> bool {
        !self.container_size.is_empty() && !self.content_size.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ZoomState {
    Idle,
    Animating {
        animation: TransformAnimation,
        kind: ContinuousTransformType,
    },
    Flinging(FlingAnimation),
    Gesturing {
        /// Undamped accumulated user scale
        raw_scale: f32,
        /// Undamped accumulated user offset
        raw_offset: Offset,
        /// Last gesture centroid in container coordinates
        centroid: Offset,
    },
}

/// Layout facts captured before a layout input changes.
struct LayoutSnapshot {
    was_ready: bool,
    transform: Transform,
    content_size: IntSize,
}

// =============================================================================
// ZoomableEngine
// =============================================================================

/// Tracks the transform of zoomable content inside a container.
#[derive(Debug, Clone)]
pub struct ZoomableEngine {
    config: ZoomConfig,

    container_size: IntSize,
    content_size: IntSize,
    content_origin_size: IntSize,
    content_scale: ContentScale,
    alignment: Alignment,
    rotation: i32,

    base_transform: Transform,
    user_transform: Transform,

    /// Final scales `[min, medium, max]`
    scales: [f32; 3],

    state: ZoomState,
}

impl ZoomableEngine {
    /// Create an engine with no container or content yet.
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            config,
            container_size: IntSize::ZERO,
            content_size: IntSize::ZERO,
            content_origin_size: IntSize::ZERO,
            content_scale: ContentScale::default(),
            alignment: Alignment::default(),
            rotation: 0,
            base_transform: Transform::ORIGIN,
            user_transform: Transform::ORIGIN,
            scales: [1.0; 3],
            state: ZoomState::Idle,
        }
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    // =========================================================================
    // Layout Inputs
    // =========================================================================

    /// Set the container size. The visible transform is preserved.
    pub fn set_container_size(&mut self, size: IntSize) {
        if size == self.container_size {
            return;
        }
        let snapshot = self.snapshot();
        self.container_size = size;
        self.relayout(snapshot);
    }

    /// Set the size of the displayed content (e.g. the preview bitmap).
    ///
    /// When a larger or smaller version of the same image replaces the
    /// current content, the same region stays visible.
    pub fn set_content_size(&mut self, size: IntSize) {
        if size == self.content_size {
            return;
        }
        let snapshot = self.snapshot();
        self.content_size = size;
        self.relayout(snapshot);
    }

    /// Set the full-resolution size of the image behind the content.
    pub fn set_content_origin_size(&mut self, size: IntSize) {
        if size == self.content_origin_size {
            return;
        }
        self.content_origin_size = size;
        if self.is_ready() {
            self.update_base();
            self.user_transform = self.limit_user(self.user_transform);
        }
    }

    pub fn set_content_scale(&mut self, content_scale: ContentScale) {
        if content_scale == self.content_scale {
            return;
        }
        let snapshot = self.snapshot();
        self.content_scale = content_scale;
        self.relayout(snapshot);
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        if alignment == self.alignment {
            return;
        }
        let snapshot = self.snapshot();
        self.alignment = alignment;
        self.relayout(snapshot);
    }

    pub fn set_rtl(&mut self, rtl: bool) {
        if rtl == self.config.rtl {
            return;
        }
        let snapshot = self.snapshot();
        self.config.rtl = rtl;
        self.relayout(snapshot);
    }

    /// Change the read mode. The initial transform is re-applied.
    pub fn set_read_mode(&mut self, read_mode: Option<ReadMode>) {
        if read_mode == self.config.read_mode {
            return;
        }
        self.config.read_mode = read_mode;
        self.reset();
    }

    pub fn set_three_step_scale(&mut self, three_step_scale: bool) {
        self.config.three_step_scale = three_step_scale;
    }

    /// Rotate to an absolute rotation. Rejects rotations that are not a
    /// multiple of 90 degrees and leaves the state untouched.
    ///
    /// Rotation resets the user transform to the initial transform.
    pub fn rotate_to(&mut self, rotation: i32) -> Result<(), ZoomError> {
        if rotation % 90 != 0 {
            warn!(rotation = rotation, "Rejected rotation: not a multiple of 90");
            return Err(ZoomError::InvalidRotation(rotation));
        }
        let rotation = normalize_rotation(rotation);
        if rotation == self.rotation {
            return Ok(());
        }
        self.rotation = rotation;
        self.reset();
        Ok(())
    }

    /// Rotate relative to the current rotation.
    pub fn rotate_by(&mut self, degrees: i32) -> Result<(), ZoomError> {
        if degrees % 90 != 0 {
            warn!(degrees = degrees, "Rejected rotation: not a multiple of 90");
            return Err(ZoomError::InvalidRotation(degrees));
        }
        self.rotate_to(self.rotation + degrees)
    }

    /// Recompute the base transform and return to the initial user transform.
    pub fn reset(&mut self) {
        self.state = ZoomState::Idle;
        if !self.is_ready() {
            self.clear_transforms();
            return;
        }
        self.update_base();
        self.user_transform = self.initial_user_transform();
        debug!(
            container = %self.container_size,
            content = %self.content_size,
            rotation = self.rotation,
            "Reset transform"
        );
    }

    // =========================================================================
    // Programmatic Transforms
    // =========================================================================

    /// Scale to a final scale, keeping `centroid` (content coordinates) at
    /// the same container position. Without a centroid the content point
    /// under the container center is used.
    ///
    /// The scale is clamped to `[min_scale, max_scale]`.
    pub fn scale_to(
        &mut self,
        scale: f32,
        centroid: Option<Offset>,
        animated: bool,
        now_ms: u64,
    ) -> Result<(), ZoomError> {
        if !(scale.is_finite() && scale > 0.0) {
            warn!(scale = scale, "Rejected scale");
            return Err(ZoomError::InvalidScale(scale));
        }
        if !self.is_ready() {
            return Ok(());
        }
        let user_scale = self.clamp_user_scale(scale / self.base_transform.scale_x());
        let centroid = centroid.unwrap_or_else(|| self.container_center_content_point());
        let anchor = self.base_transform.content_to_container(centroid, self.content_size);
        let fixed = self.transform().content_to_container(centroid, self.content_size);
        let target = self.limit_user(Transform::new(
            ScaleFactor::uniform(user_scale),
            fixed - anchor * user_scale,
            0,
        ));
        self.apply_user(target, animated, now_ms, ContinuousTransformType::Scale);
        Ok(())
    }

    /// Multiply the current final scale by `factor`.
    pub fn scale_by(
        &mut self,
        factor: f32,
        centroid: Option<Offset>,
        animated: bool,
        now_ms: u64,
    ) -> Result<(), ZoomError> {
        self.scale_to(self.scale() * factor, centroid, animated, now_ms)
    }

    /// Cycle to the next step scale: `[min, medium]`, or `[min, medium, max]`
    /// with three-step scaling. Returns the chosen scale.
    pub fn switch_scale(
        &mut self,
        centroid: Option<Offset>,
        animated: bool,
        now_ms: u64,
    ) -> Result<f32, ZoomError> {
        let [min, medium, max] = self.scales;
        let steps: &[f32] = if self.config.three_step_scale {
            &[min, medium, max]
        } else {
            &[min, medium]
        };
        let next = calculate_next_step_scale(steps, self.scale(), self.config.step_scale_tolerance);
        self.scale_to(next, centroid, animated, now_ms)?;
        Ok(next)
    }

    /// Move the user offset to `offset`, clamped to the offset bounds.
    pub fn offset_to(&mut self, offset: Offset, animated: bool, now_ms: u64) {
        if !self.is_ready() {
            return;
        }
        let target = self.limit_user(Transform::new(self.user_transform.scale, offset, 0));
        self.apply_user(target, animated, now_ms, ContinuousTransformType::Offset);
    }

    /// Move the user offset by `delta` container pixels.
    pub fn pan_by(&mut self, delta: Offset, animated: bool, now_ms: u64) {
        self.offset_to(self.user_transform.offset + delta, animated, now_ms);
    }

    /// Center a content point in the container, optionally at a new final
    /// scale. The result is clamped, so points near an edge end up as close
    /// to the center as the bounds allow.
    pub fn locate(
        &mut self,
        content_point: Offset,
        scale: Option<f32>,
        animated: bool,
        now_ms: u64,
    ) -> Result<(), ZoomError> {
        if let Some(scale) = scale {
            if !(scale.is_finite() && scale > 0.0) {
                warn!(scale = scale, "Rejected locate scale");
                return Err(ZoomError::InvalidScale(scale));
            }
        }
        if !self.is_ready() {
            return Ok(());
        }
        let user_scale = match scale {
            Some(scale) => self.clamp_user_scale(scale / self.base_transform.scale_x()),
            None => self.user_transform.scale_x(),
        };
        let anchor = self.base_transform.content_to_container(content_point, self.content_size);
        let center = self.container_size.to_rect().center();
        let target = self.limit_user(Transform::new(
            ScaleFactor::uniform(user_scale),
            center - anchor * user_scale,
            0,
        ));
        self.apply_user(target, animated, now_ms, ContinuousTransformType::Locate);
        Ok(())
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Begin a pointer gesture. Any running animation stops.
    pub fn gesture_start(&mut self) {
        if !self.is_ready() {
            return;
        }
        self.cancel_animation();
        self.state = ZoomState::Gesturing {
            raw_scale: self.user_transform.scale_x(),
            raw_offset: self.user_transform.offset,
            centroid: self.container_size.to_rect().center(),
        };
    }

    /// Apply one gesture step: zoom by `zoom` around `centroid` (container
    /// coordinates), then pan by `pan`.
    ///
    /// Past the scale or offset bounds the change is damped when rubber
    /// banding is enabled, otherwise clamped.
    pub fn gesture_update(&mut self, centroid: Offset, pan: Offset, zoom: f32) {
        if !self.is_ready() {
            return;
        }
        if !matches!(self.state, ZoomState::Gesturing { .. }) {
            self.gesture_start();
        }
        let ZoomState::Gesturing {
            raw_scale,
            raw_offset,
            ..
        } = self.state
        else {
            return;
        };
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };

        let current_scale = self.user_transform.scale_x();
        let new_raw_scale = raw_scale * zoom;
        let scale = self.damp_scale(new_raw_scale);
        // Pivot the displayed transform, and move the raw offset by the same
        // amount so any offset overshoot is carried over
        let offset = self.user_transform.offset;
        let anchor = (centroid - offset) * (1.0 / current_scale);
        let pivoted = centroid - anchor * scale;
        let new_raw_offset = raw_offset + (pivoted - offset) + pan;
        let bounds = self.user_offset_bounds_for(scale);
        let offset = self.damp_offset(new_raw_offset, &bounds);

        self.user_transform = Transform::new(ScaleFactor::uniform(scale), offset, 0);
        self.state = ZoomState::Gesturing {
            raw_scale: new_raw_scale,
            raw_offset: new_raw_offset,
            centroid,
        };
    }

    /// End a gesture with the release velocity in pixels per second.
    ///
    /// Out-of-bounds transforms settle back with an animation; otherwise a
    /// fast enough release starts a fling.
    pub fn gesture_end(&mut self, velocity: Offset, now_ms: u64) {
        let ZoomState::Gesturing { centroid, .. } = self.state else {
            return;
        };
        self.state = ZoomState::Idle;

        let scale = self.user_transform.scale_x();
        let target_scale = self.clamp_user_scale(scale);
        let offset = if (target_scale - scale).abs() > TRANSFORM_TOLERANCE {
            let anchor = (centroid - self.user_transform.offset) * (1.0 / scale);
            centroid - anchor * target_scale
        } else {
            self.user_transform.offset
        };
        let bounds = self.user_offset_bounds_for(target_scale);
        let target = Transform::new(
            ScaleFactor::uniform(target_scale),
            clamp_offset(offset, &bounds),
            0,
        );
        if !target.approx_eq(&self.user_transform, TRANSFORM_TOLERANCE) {
            debug!(scale = scale, target_scale = target_scale, "Settling out-of-bounds transform");
            self.apply_user(target, true, now_ms, ContinuousTransformType::Scale);
            return;
        }

        let speed = velocity.distance();
        if speed.is_finite() && speed >= self.config.fling_min_velocity && speed > 0.0 {
            self.state = ZoomState::Flinging(FlingAnimation {
                start: self.user_transform.offset,
                velocity,
                start_ms: now_ms,
                friction: self.config.fling_friction,
                min_velocity: self.config.fling_min_velocity,
                bounds,
            });
        }
    }

    // =========================================================================
    // Frame Clock
    // =========================================================================

    /// Advance animations to `now_ms`. Returns true while another frame is
    /// needed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        match self.state {
            ZoomState::Animating { animation, .. } => {
                let (transform, finished) = animation.value_at(now_ms);
                self.user_transform = transform;
                if finished {
                    self.state = ZoomState::Idle;
                }
                !finished
            }
            ZoomState::Flinging(fling) => {
                let (offset, finished) = fling.value_at(now_ms);
                self.user_transform.offset = offset;
                if finished {
                    self.state = ZoomState::Idle;
                }
                !finished
            }
            ZoomState::Gesturing { .. } | ZoomState::Idle => false,
        }
    }

    /// Stop any animation or fling, leaving a transform within bounds.
    pub fn cancel_animation(&mut self) {
        if matches!(self.state, ZoomState::Animating { .. } | ZoomState::Flinging(_)) {
            self.state = ZoomState::Idle;
            self.user_transform = self.limit_user(self.user_transform);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_ready(&self) -> bool {
        !self.container_size.is_empty() && !self.content_size.is_empty()
    }

    pub fn container_size(&self) -> IntSize {
        self.container_size
    }

    pub fn content_size(&self) -> IntSize {
        self.content_size
    }

    pub fn content_origin_size(&self) -> IntSize {
        self.content_origin_size
    }

    pub fn content_scale(&self) -> ContentScale {
        self.content_scale
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// Combined transform applied to the content.
    pub fn transform(&self) -> Transform {
        self.base_transform.concat(&self.user_transform)
    }

    pub fn base_transform(&self) -> Transform {
        self.base_transform
    }

    pub fn user_transform(&self) -> Transform {
        self.user_transform
    }

    /// Current final horizontal scale.
    pub fn scale(&self) -> f32 {
        self.transform().scale_x()
    }

    pub fn min_scale(&self) -> f32 {
        self.scales[0]
    }

    pub fn medium_scale(&self) -> f32 {
        self.scales[1]
    }

    pub fn max_scale(&self) -> f32 {
        self.scales[2]
    }

    pub fn phase(&self) -> ZoomPhase {
        match self.state {
            ZoomState::Idle => ZoomPhase::Idle,
            ZoomState::Animating { .. } | ZoomState::Flinging(_) => ZoomPhase::Animating,
            ZoomState::Gesturing { .. } => ZoomPhase::Gesturing,
        }
    }

    pub fn continuous_transform_type(&self) -> ContinuousTransformType {
        match self.state {
            ZoomState::Idle => ContinuousTransformType::None,
            ZoomState::Animating { kind, .. } => kind,
            ZoomState::Flinging(_) => ContinuousTransformType::Fling,
            ZoomState::Gesturing { .. } => ContinuousTransformType::Gesture,
        }
    }

    /// Content rectangle in the container under the base transform.
    pub fn content_base_display_rect(&self) -> Rect {
        calculate_content_display_rect(self.content_size, &self.base_transform)
    }

    /// Content rectangle in the container under the current transform.
    pub fn content_display_rect(&self) -> Rect {
        calculate_content_display_rect(self.content_size, &self.transform())
    }

    /// Visible content region, in content coordinates.
    pub fn content_visible_rect(&self) -> Rect {
        calculate_content_visible_rect(self.container_size, self.content_size, &self.transform())
    }

    /// Visible content region under the base transform.
    pub fn content_base_visible_rect(&self) -> Rect {
        calculate_content_visible_rect(self.container_size, self.content_size, &self.base_transform)
    }

    /// Allowed range of the user offset at the current scale.
    pub fn user_offset_bounds(&self) -> Rect {
        self.user_offset_bounds_for(self.user_transform.scale_x())
    }

    pub fn scroll_edge(&self) -> ScrollEdge {
        calculate_scroll_edge(&self.user_offset_bounds(), self.user_transform.offset)
    }

    /// Whether the content can move further along one axis. Negative
    /// directions ask about the start edge, positive about the end edge.
    pub fn can_scroll(&self, horizontal: bool, direction: i32) -> bool {
        self.scroll_edge().can_scroll(horizontal, direction)
    }

    /// Map a container point to content coordinates, clamped to the content.
    pub fn touch_point_to_content_point(&self, point: Offset) -> Offset {
        if !self.is_ready() {
            return Offset::ZERO;
        }
        let p = self.transform().container_to_content(point, self.content_size);
        Offset::new(
            p.x.clamp(0.0, self.content_size.width as f32),
            p.y.clamp(0.0, self.content_size.height as f32),
        )
    }

    /// Map a content point into the container.
    pub fn content_point_to_container_point(&self, point: Offset) -> Offset {
        self.transform().content_to_container(point, self.content_size)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            container_size: self.container_size,
            content_size: self.content_size,
            content_origin_size: self.content_origin_size,
            transform: self.transform(),
            content_visible_rect: self.content_visible_rect(),
            continuous_transform_type: self.continuous_transform_type(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            was_ready: self.is_ready(),
            transform: self.transform(),
            content_size: self.content_size,
        }
    }

    fn clear_transforms(&mut self) {
        self.base_transform = Transform::ORIGIN;
        self.user_transform = Transform::ORIGIN;
        self.scales = [1.0; 3];
    }

    /// Recompute after a layout input changed, preserving the combined
    /// transform when there was one.
    fn relayout(&mut self, before: LayoutSnapshot) {
        self.state = ZoomState::Idle;
        if !self.is_ready() {
            self.clear_transforms();
            return;
        }
        if !before.was_ready {
            self.reset();
            return;
        }

        self.update_base();
        let mut combined = before.transform;
        let old_content = before.content_size.rotate(self.rotation);
        let new_content = self.content_size.rotate(self.rotation);
        if old_content != new_content && !old_content.is_empty() {
            combined.scale = combined.scale
                * ScaleFactor::new(
                    old_content.width as f32 / new_content.width as f32,
                    old_content.height as f32 / new_content.height as f32,
                );
        }
        combined.rotation = self.base_transform.rotation;
        let user = combined.split(&self.base_transform);
        self.user_transform =
            self.limit_user(Transform::new(ScaleFactor::uniform(user.scale_x()), user.offset, 0));
        debug!(
            container = %self.container_size,
            content = %self.content_size,
            scale = self.scale(),
            "Relayout"
        );
    }

    fn update_base(&mut self) {
        self.base_transform = resolve_base_transform(
            self.container_size,
            self.content_size,
            self.content_scale,
            self.alignment,
            self.config.rtl,
            self.rotation,
        );
        self.scales = compute_support_scales(
            self.container_size,
            self.content_size,
            self.content_origin_size,
            self.content_scale,
            self.rotation,
            self.base_transform.scale,
            self.config.medium_scale_multiple,
        );
    }

    fn initial_user_transform(&self) -> Transform {
        let Some(read_mode) = self.config.read_mode else {
            return Transform::ORIGIN;
        };
        if self.content_scale == ContentScale::FillBounds || !self.base_transform.scale.is_uniform() {
            return Transform::ORIGIN;
        }
        let rotated = self.content_size.rotate(self.rotation);
        if !read_mode.accept(rotated, self.container_size) {
            return Transform::ORIGIN;
        }
        let transform = compute_read_mode_transform(
            rotated.to_size(),
            self.container_size.to_size(),
            &self.base_transform,
        );
        self.limit_user(Transform::new(
            ScaleFactor::uniform(transform.scale_x()),
            transform.offset,
            0,
        ))
    }

    fn min_user_scale(&self) -> f32 {
        self.scales[0] / self.base_transform.scale_x()
    }

    fn max_user_scale(&self) -> f32 {
        self.scales[2] / self.base_transform.scale_x()
    }

    fn clamp_user_scale(&self, scale: f32) -> f32 {
        let min = self.min_user_scale();
        let max = self.max_user_scale().max(min);
        scale.clamp(min, max)
    }

    fn user_offset_bounds_for(&self, user_scale: f32) -> Rect {
        calculate_user_offset_bounds(
            self.container_size,
            self.content_base_display_rect(),
            ScaleFactor::uniform(user_scale),
            self.alignment,
            self.config.rtl,
        )
    }

    fn limit_user(&self, user: Transform) -> Transform {
        let scale = self.clamp_user_scale(user.scale_x());
        let bounds = self.user_offset_bounds_for(scale);
        Transform::new(ScaleFactor::uniform(scale), clamp_offset(user.offset, &bounds), 0)
    }

    fn damp_scale(&self, raw: f32) -> f32 {
        let min = self.min_user_scale();
        let max = self.max_user_scale().max(min);
        if !self.config.rubber_band_scale {
            return raw.clamp(min, max);
        }
        let bound = if raw > max { max } else { min };
        rubber_band(raw, min, max, bound * self.config.rubber_band_scale_ratio)
    }

    fn damp_offset(&self, raw: Offset, bounds: &Rect) -> Offset {
        if !self.config.rubber_band_offset {
            return clamp_offset(raw, bounds);
        }
        let ratio = self.config.rubber_band_offset_ratio;
        Offset::new(
            rubber_band(
                raw.x,
                bounds.left,
                bounds.right,
                self.container_size.width as f32 * ratio,
            ),
            rubber_band(
                raw.y,
                bounds.top,
                bounds.bottom,
                self.container_size.height as f32 * ratio,
            ),
        )
    }

    fn container_center_content_point(&self) -> Offset {
        self.touch_point_to_content_point(self.container_size.to_rect().center())
    }

    fn apply_user(
        &mut self,
        target: Transform,
        animated: bool,
        now_ms: u64,
        kind: ContinuousTransformType,
    ) {
        self.state = ZoomState::Idle;
        let animate = animated
            && self.config.animation_duration_ms > 0
            && !target.approx_eq(&self.user_transform, TRANSFORM_TOLERANCE);
        if animate {
            self.state = ZoomState::Animating {
                animation: TransformAnimation::new(
                    self.user_transform,
                    target,
                    now_ms,
                    self.config.animation_duration_ms,
                    self.config.easing,
                ),
                kind,
            };
        } else {
            self.user_transform = target;
        }
    }
}

impl Default for ZoomableEngine {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}
