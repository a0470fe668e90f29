//! Transform mathematics shared by the zoom and subsampling engines.
//!
//! Everything in this module is pure and stateless:
//!
//! - [`Transform`] with [`Transform::concat`] / [`Transform::split`]
//! - [`ContentScale`] and [`Alignment`] resolution into a base transform
//! - [`ReadMode`] transforms for long images
//! - support scales and tap-to-cycle step selection
//! - display/visible rectangles, user offset bounds, and scroll edges

mod affine;
mod content_scale;
mod read_mode;
mod rects;
mod scales;

pub use affine::{
    reverse_rotate_point, rotate_point, rotated_size, rotation_correction, Transform,
};
pub use content_scale::{resolve_base_transform, Alignment, ContentScale};
pub use read_mode::{
    compute_read_mode_transform, LongImageDecider, ReadMode, ReadModeSizeType,
    DEFAULT_NOT_SAME_DIRECTION_MULTIPLE, DEFAULT_SAME_DIRECTION_MULTIPLE,
};
pub use rects::{
    calculate_content_display_rect, calculate_content_visible_rect, calculate_scroll_edge,
    calculate_user_offset_bounds, clamp_offset, Edge, ScrollEdge,
};
pub use scales::{
    calculate_next_step_scale, compute_support_scales, DEFAULT_MEDIUM_SCALE_MULTIPLE,
    MAX_SCALE_MULTIPLE,
};
