//! Display/visible rectangles, user offset bounds, and scroll edges.

use serde::{Deserialize, Serialize};

use crate::geometry::{IntSize, Offset, Rect, ScaleFactor};

use super::affine::Transform;
use super::content_scale::Alignment;

/// Tolerance used when deciding whether content touches an edge.
const EDGE_TOLERANCE: f32 = 0.5;

/// Where the content touches the container on one axis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Content overflows on both sides
    #[default]
    None,
    /// The start (left/top) edge of the content is visible
    Start,
    /// The end (right/bottom) edge of the content is visible
    End,
    /// Both edges are visible, nothing to scroll
    Both,
}

/// Per-axis scroll edges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollEdge {
    pub horizontal: Edge,
    pub vertical: Edge,
}

impl ScrollEdge {
    /// Whether content can still move in `direction` along one axis.
    ///
    /// Negative directions scroll toward the start, positive toward the end,
    /// zero asks whether any scrolling is possible.
    pub fn can_scroll(&self, horizontal: bool, direction: i32) -> bool {
        let edge = if horizontal {
            self.horizontal
        } else {
            self.vertical
        };
        match direction {
            d if d < 0 => !matches!(edge, Edge::Start | Edge::Both),
            d if d > 0 => !matches!(edge, Edge::End | Edge::Both),
            _ => edge != Edge::Both,
        }
    }
}

/// Rectangle the content occupies in the container under `transform`.
pub fn calculate_content_display_rect(content_size: IntSize, transform: &Transform) -> Rect {
    if content_size.is_empty() {
        return Rect::ZERO;
    }
    transform.map_rect(content_size.to_rect().to_rect(), content_size)
}

/// Part of the content (in content coordinates) visible in the container.
///
/// Empty when the content is entirely outside the container.
pub fn calculate_content_visible_rect(
    container_size: IntSize,
    content_size: IntSize,
    transform: &Transform,
) -> Rect {
    if container_size.is_empty() || content_size.is_empty() {
        return Rect::ZERO;
    }
    let display = calculate_content_display_rect(content_size, transform);
    let container = container_size.to_rect().to_rect();
    match display.intersect(&container) {
        Some(visible) => {
            let content = content_size.to_rect().to_rect();
            let rect = transform.reverse_map_rect(visible, content_size);
            rect.intersect(&content).unwrap_or(Rect::ZERO)
        }
        None => Rect::ZERO,
    }
}

/// Allowed range of the user offset, as a rectangle of offsets.
///
/// `base_display_rect` is the content rectangle under the base transform.
/// On an axis where the scaled content overflows the container, the offset
/// may move so that the content always covers the container. On an axis
/// where it does not, the offset is pinned to the aligned position.
pub fn calculate_user_offset_bounds(
    container_size: IntSize,
    base_display_rect: Rect,
    user_scale: ScaleFactor,
    alignment: Alignment,
    rtl: bool,
) -> Rect {
    if container_size.is_empty() || base_display_rect.is_empty() {
        return Rect::ZERO;
    }
    let container = container_size.to_size();
    let scaled = base_display_rect.scale(user_scale);
    let aligned = alignment.align(scaled.size(), container, rtl);

    let (left, right) = if scaled.width() >= container.width - EDGE_TOLERANCE {
        (container.width - scaled.right, -scaled.left)
    } else {
        let x = aligned.x - scaled.left;
        (x, x)
    };
    let (top, bottom) = if scaled.height() >= container.height - EDGE_TOLERANCE {
        (container.height - scaled.bottom, -scaled.top)
    } else {
        let y = aligned.y - scaled.top;
        (y, y)
    };
    Rect::new(left.min(right), top.min(bottom), left.max(right), top.max(bottom))
}

/// Clamp a user offset into `bounds`.
pub fn clamp_offset(offset: Offset, bounds: &Rect) -> Offset {
    Offset::new(
        offset.x.clamp(bounds.left, bounds.right),
        offset.y.clamp(bounds.top, bounds.bottom),
    )
}

/// Scroll edges for a user offset within its bounds.
pub fn calculate_scroll_edge(bounds: &Rect, offset: Offset) -> ScrollEdge {
    fn axis(min: f32, max: f32, value: f32) -> Edge {
        // The largest offset shows the start edge of the content
        let at_start = value >= max - EDGE_TOLERANCE;
        let at_end = value <= min + EDGE_TOLERANCE;
        match (at_start, at_end) {
            (true, true) => Edge::Both,
            (true, false) => Edge::Start,
            (false, true) => Edge::End,
            (false, false) => Edge::None,
        }
    }
    ScrollEdge {
        horizontal: axis(bounds.left, bounds.right, offset.x),
        vertical: axis(bounds.top, bounds.bottom, offset.y),
    }
}
