//! Image metadata and EXIF orientation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{IntRect, IntSize};

/// Mime types that region decoders can serve tiles for.
pub const REGION_DECODABLE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/bmp",
    "image/heic",
    "image/heif",
];

/// True when tiles can be decoded from images of this mime type.
pub fn is_region_decodable(mime_type: &str) -> bool {
    REGION_DECODABLE_MIME_TYPES
        .iter()
        .any(|m| m.eq_ignore_ascii_case(mime_type))
}

// =============================================================================
// ExifOrientation
// =============================================================================

/// The eight EXIF orientations.
///
/// Each variant names how the stored pixels must be transformed to be shown
/// upright. Variants 5 through 8 swap width and height.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExifOrientation {
    /// 1
    #[default]
    Normal,
    /// 2
    FlipHorizontal,
    /// 3
    Rotate180,
    /// 4
    FlipVertical,
    /// 5: mirror along the main diagonal
    Transpose,
    /// 6: rotate 90 degrees clockwise
    Rotate90,
    /// 7: mirror along the anti-diagonal
    Transverse,
    /// 8: rotate 270 degrees clockwise
    Rotate270,
}

impl ExifOrientation {
    /// Parse the EXIF `Orientation` tag value. Unknown values read as normal.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => ExifOrientation::FlipHorizontal,
            3 => ExifOrientation::Rotate180,
            4 => ExifOrientation::FlipVertical,
            5 => ExifOrientation::Transpose,
            6 => ExifOrientation::Rotate90,
            7 => ExifOrientation::Transverse,
            8 => ExifOrientation::Rotate270,
            _ => ExifOrientation::Normal,
        }
    }

    pub fn to_exif(self) -> u32 {
        match self {
            ExifOrientation::Normal => 1,
            ExifOrientation::FlipHorizontal => 2,
            ExifOrientation::Rotate180 => 3,
            ExifOrientation::FlipVertical => 4,
            ExifOrientation::Transpose => 5,
            ExifOrientation::Rotate90 => 6,
            ExifOrientation::Transverse => 7,
            ExifOrientation::Rotate270 => 8,
        }
    }

    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            ExifOrientation::Transpose
                | ExifOrientation::Rotate90
                | ExifOrientation::Transverse
                | ExifOrientation::Rotate270
        )
    }

    /// Displayed size of an image stored as `raw`.
    pub fn apply_to_size(self, raw: IntSize) -> IntSize {
        if self.swaps_axes() {
            IntSize::new(raw.height, raw.width)
        } else {
            raw
        }
    }

    /// Map a point of the displayed image back into stored pixel space.
    ///
    /// Points are pixel corners, so `(0, 0)` and `(width, height)` are the
    /// opposite corners of the image.
    fn display_to_raw(self, x: i32, y: i32, raw: IntSize) -> (i32, i32) {
        let w = raw.width as i32;
        let h = raw.height as i32;
        match self {
            ExifOrientation::Normal => (x, y),
            ExifOrientation::FlipHorizontal => (w - x, y),
            ExifOrientation::Rotate180 => (w - x, h - y),
            ExifOrientation::FlipVertical => (x, h - y),
            ExifOrientation::Transpose => (y, x),
            ExifOrientation::Rotate90 => (y, h - x),
            ExifOrientation::Transverse => (w - y, h - x),
            ExifOrientation::Rotate270 => (w - y, x),
        }
    }

    /// Map a rectangle of the displayed image into stored pixel space.
    pub fn display_rect_to_raw(self, rect: IntRect, raw: IntSize) -> IntRect {
        let (x1, y1) = self.display_to_raw(rect.left, rect.top, raw);
        let (x2, y2) = self.display_to_raw(rect.right, rect.bottom, raw);
        IntRect::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
    }
}

impl fmt::Display for ExifOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExifOrientation::Normal => "normal",
            ExifOrientation::FlipHorizontal => "flip_horizontal",
            ExifOrientation::Rotate180 => "rotate_180",
            ExifOrientation::FlipVertical => "flip_vertical",
            ExifOrientation::Transpose => "transpose",
            ExifOrientation::Rotate90 => "rotate_90",
            ExifOrientation::Transverse => "transverse",
            ExifOrientation::Rotate270 => "rotate_270",
        };
        f.write_str(name)
    }
}

// =============================================================================
// ImageInfo
// =============================================================================

/// Size, type and orientation of a source image.
///
/// `width` and `height` describe the coordinate space of the decoder that
/// produced this info: tile rectangles passed to that decoder use them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    /// Orientation still to be applied to the pixels of `width x height`
    pub exif_orientation: ExifOrientation,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32, mime_type: impl Into<String>) -> Self {
        Self {
            width,
            height,
            mime_type: mime_type.into(),
            exif_orientation: ExifOrientation::Normal,
        }
    }

    pub fn with_orientation(mut self, orientation: ExifOrientation) -> Self {
        self.exif_orientation = orientation;
        self
    }

    pub fn size(&self) -> IntSize {
        IntSize::new(self.width, self.height)
    }

    /// Size of the image once its orientation is applied.
    pub fn display_size(&self) -> IntSize {
        self.exif_orientation.apply_to_size(self.size())
    }

    /// Info describing the upright image: display size, normal orientation.
    pub fn oriented(&self) -> ImageInfo {
        let size = self.display_size();
        ImageInfo {
            width: size.width,
            height: size.height,
            mime_type: self.mime_type.clone(),
            exif_orientation: ExifOrientation::Normal,
        }
    }
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} {} ({})",
            self.width, self.height, self.mime_type, self.exif_orientation
        )
    }
}
