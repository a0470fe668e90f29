//! Zoom engine tests through the public API.
//!
//! These cover the documented layouts for a 6799x4882 photo previewed at
//! 500x359, the step-scale rules, and a full gesture then fling sequence.

use zoomimage::error::ZoomError;
use zoomimage::geometry::{IntRect, IntSize, Offset};
use zoomimage::transform::{calculate_next_step_scale, Alignment, ContentScale};
use zoomimage::zoom::{ContinuousTransformType, ZoomPhase, ZoomableEngine};

const TOLERANCE: f32 = 1e-3;

fn photo_engine() -> ZoomableEngine {
    let mut engine = ZoomableEngine::default();
    engine.set_container_size(IntSize::new(500, 500));
    engine.set_content_size(IntSize::new(500, 359));
    engine.set_content_origin_size(IntSize::new(6799, 4882));
    engine
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_fit_center_layout() {
    let engine = photo_engine();
    assert_eq!(engine.content_scale(), ContentScale::Fit);
    assert_eq!(engine.alignment(), Alignment::Center);
    assert_eq!(engine.content_display_rect().round(), IntRect::new(0, 71, 500, 430));
    assert!((engine.min_scale() - 1.0).abs() < TOLERANCE);
    assert!(engine.medium_scale() > engine.min_scale());
    assert!(engine.max_scale() >= engine.medium_scale());
}

#[test]
fn test_unscaled_bottom_end_layout() {
    let mut engine = photo_engine();
    engine.set_content_scale(ContentScale::None);
    engine.set_alignment(Alignment::BottomEnd);
    assert_eq!(engine.content_display_rect().round(), IntRect::new(0, 141, 500, 500));
}

#[test]
fn test_layout_is_independent_of_setter_order() {
    let mut engine = ZoomableEngine::default();
    engine.set_alignment(Alignment::BottomEnd);
    engine.set_content_scale(ContentScale::None);
    engine.set_content_origin_size(IntSize::new(6799, 4882));
    engine.set_content_size(IntSize::new(500, 359));
    engine.set_container_size(IntSize::new(500, 500));
    assert_eq!(engine.content_display_rect().round(), IntRect::new(0, 141, 500, 500));
}

#[test]
fn test_quarter_turn_swaps_display_size() {
    let mut engine = photo_engine();
    engine.rotate_to(90).unwrap();
    let rect = engine.content_display_rect();
    assert!((rect.width() - 359.0).abs() < 1.0, "width {}", rect.width());
    assert!((rect.height() - 500.0).abs() < 1.0, "height {}", rect.height());
    assert_eq!(engine.rotation(), 90);
}

#[test]
fn test_rejected_requests_leave_state_alone() {
    let mut engine = photo_engine();
    engine.scale_to(3.0, None, false, 0).unwrap();
    let before = engine.transform();

    assert_eq!(engine.rotate_to(45), Err(ZoomError::InvalidRotation(45)));
    assert!(engine.scale_to(f32::NAN, None, false, 0).is_err());
    assert!(matches!(
        engine.scale_to(-2.0, None, false, 0),
        Err(ZoomError::InvalidScale(_))
    ));
    assert_eq!(engine.transform(), before);
}

// =============================================================================
// Step Scales
// =============================================================================

#[test]
fn test_next_step_scale() {
    let steps = [1.0, 2.0, 3.0, 4.0, 5.0];
    assert_eq!(calculate_next_step_scale(&steps, 0.9, 0.1), 2.0);
    assert_eq!(calculate_next_step_scale(&steps, 0.9, 0.0), 1.0);
    // Past the last step wraps back to the first
    assert_eq!(calculate_next_step_scale(&steps, 5.0, 0.1), 1.0);
}

#[test]
fn test_switch_scale_round_trip() {
    let mut engine = photo_engine();
    let min = engine.min_scale();
    let medium = engine.switch_scale(None, false, 0).unwrap();
    assert!((medium - engine.medium_scale()).abs() < TOLERANCE);
    assert!((engine.scale() - medium).abs() < TOLERANCE);

    let back = engine.switch_scale(None, false, 0).unwrap();
    assert!((back - min).abs() < TOLERANCE);
    assert_eq!(engine.content_display_rect().round(), IntRect::new(0, 71, 500, 430));
}

// =============================================================================
// Gestures and Animations
// =============================================================================

#[test]
fn test_animated_zoom_then_locate() {
    let mut engine = photo_engine();
    engine.scale_to(4.0, None, true, 0).unwrap();
    assert_eq!(engine.phase(), ZoomPhase::Animating);
    assert_eq!(engine.continuous_transform_type(), ContinuousTransformType::Scale);
    while engine.tick(10_000) {}
    assert_eq!(engine.phase(), ZoomPhase::Idle);
    assert!((engine.scale() - 4.0).abs() < TOLERANCE);

    let point = Offset::new(100.0, 100.0);
    engine.locate(point, None, false, 0).unwrap();
    let on_screen = engine.content_point_to_container_point(point);
    // Near the top-left corner, so clamping stops short of the center
    assert!(on_screen.x <= 250.0 + TOLERANCE);
    let visible = engine.content_visible_rect();
    assert!(visible.left <= point.x && point.x <= visible.right);
    assert!(visible.top <= point.y && point.y <= visible.bottom);
}

#[test]
fn test_pinch_pan_and_fling() {
    let mut engine = photo_engine();
    let center = Offset::new(250.0, 250.0);

    engine.gesture_start();
    assert_eq!(engine.continuous_transform_type(), ContinuousTransformType::Gesture);
    engine.gesture_update(center, Offset::ZERO, 2.0);
    engine.gesture_update(center, Offset::new(-40.0, 0.0), 1.0);
    assert!((engine.scale() - 2.0).abs() < 0.01);
    assert_eq!(engine.viewport().continuous_transform_type, ContinuousTransformType::Gesture);

    let before = engine.user_transform().offset;
    engine.gesture_end(Offset::new(-2000.0, 0.0), 0);
    assert_eq!(engine.continuous_transform_type(), ContinuousTransformType::Fling);
    assert!(engine.tick(50));
    assert!(engine.user_transform().offset.x < before.x);

    while engine.tick(60_000) {}
    assert_eq!(engine.phase(), ZoomPhase::Idle);
    let bounds = engine.user_offset_bounds();
    let offset = engine.user_transform().offset;
    assert!(offset.x >= bounds.left - TOLERANCE && offset.x <= bounds.right + TOLERANCE);
    assert!(offset.y >= bounds.top - TOLERANCE && offset.y <= bounds.bottom + TOLERANCE);
}

#[test]
fn test_over_zoom_settles_back() {
    let mut engine = photo_engine();
    let center = Offset::new(250.0, 250.0);
    engine.gesture_start();
    for _ in 0..10 {
        engine.gesture_update(center, Offset::ZERO, 2.0);
    }
    assert!(engine.scale() > engine.max_scale());

    engine.gesture_end(Offset::ZERO, 0);
    assert_eq!(engine.phase(), ZoomPhase::Animating);
    while engine.tick(10_000) {}
    assert!((engine.scale() - engine.max_scale()).abs() < TOLERANCE);
}
