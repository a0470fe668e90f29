//! Content scaling policies, alignment, and base transform resolution.
//!
//! The base transform is derived purely from the container size, the content
//! size, the [`ContentScale`] policy, the [`Alignment`] and the rotation. It is
//! what the viewer shows before any user gesture.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{normalize_rotation, IntSize, Offset, ScaleFactor, Size};

use super::affine::{rotated_size, Transform};

// =============================================================================
// ContentScale
// =============================================================================

/// How content is scaled into the container.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentScale {
    /// Uniform scale so the content fits entirely, no overflow
    #[default]
    Fit,
    /// Uniform scale so the content covers the container
    Crop,
    /// Independent x/y scale so the content fills the container exactly
    FillBounds,
    /// Uniform scale matching the container width
    FillWidth,
    /// Uniform scale matching the container height
    FillHeight,
    /// Like `Fit`, but never scales up
    Inside,
    /// No scaling
    None,
}

impl ContentScale {
    /// Scale factor mapping `src` into `dst` under this policy.
    pub fn compute_scale_factor(&self, src: Size, dst: Size) -> ScaleFactor {
        if src.is_empty() || dst.is_empty() {
            return ScaleFactor::ORIGIN;
        }
        let width_scale = dst.width / src.width;
        let height_scale = dst.height / src.height;
        match self {
            ContentScale::Fit => ScaleFactor::uniform(width_scale.min(height_scale)),
            ContentScale::Crop => ScaleFactor::uniform(width_scale.max(height_scale)),
            ContentScale::FillBounds => ScaleFactor::new(width_scale, height_scale),
            ContentScale::FillWidth => ScaleFactor::uniform(width_scale),
            ContentScale::FillHeight => ScaleFactor::uniform(height_scale),
            ContentScale::Inside => {
                if src.width <= dst.width && src.height <= dst.height {
                    ScaleFactor::ORIGIN
                } else {
                    ScaleFactor::uniform(width_scale.min(height_scale))
                }
            }
            ContentScale::None => ScaleFactor::ORIGIN,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContentScale::Fit => "fit",
            ContentScale::Crop => "crop",
            ContentScale::FillBounds => "fill_bounds",
            ContentScale::FillWidth => "fill_width",
            ContentScale::FillHeight => "fill_height",
            ContentScale::Inside => "inside",
            ContentScale::None => "none",
        }
    }
}

impl fmt::Display for ContentScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "fit" => Ok(ContentScale::Fit),
            "crop" => Ok(ContentScale::Crop),
            "fill_bounds" => Ok(ContentScale::FillBounds),
            "fill_width" => Ok(ContentScale::FillWidth),
            "fill_height" => Ok(ContentScale::FillHeight),
            "inside" => Ok(ContentScale::Inside),
            "none" => Ok(ContentScale::None),
            _ => Err(format!("unknown content scale '{}'", s)),
        }
    }
}

// =============================================================================
// Alignment
// =============================================================================

/// Nine-way placement of content inside the container.
///
/// `Start`/`End` follow the layout direction: in right-to-left layouts
/// `Start` is the right edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    TopStart,
    TopCenter,
    TopEnd,
    CenterStart,
    #[default]
    Center,
    CenterEnd,
    BottomStart,
    BottomCenter,
    BottomEnd,
}

impl Alignment {
    /// Horizontal bias in `[-1, 1]` for a left-to-right layout.
    fn horizontal_bias(&self) -> f32 {
        match self {
            Alignment::TopStart | Alignment::CenterStart | Alignment::BottomStart => -1.0,
            Alignment::TopCenter | Alignment::Center | Alignment::BottomCenter => 0.0,
            Alignment::TopEnd | Alignment::CenterEnd | Alignment::BottomEnd => 1.0,
        }
    }

    fn vertical_bias(&self) -> f32 {
        match self {
            Alignment::TopStart | Alignment::TopCenter | Alignment::TopEnd => -1.0,
            Alignment::CenterStart | Alignment::Center | Alignment::CenterEnd => 0.0,
            Alignment::BottomStart | Alignment::BottomCenter | Alignment::BottomEnd => 1.0,
        }
    }

    /// Offset placing an item of `size` inside `space`, rounded to whole
    /// pixels.
    pub fn align(&self, size: Size, space: Size, rtl: bool) -> Offset {
        let center_x = (space.width - size.width) / 2.0;
        let center_y = (space.height - size.height) / 2.0;
        let h_bias = if rtl {
            -self.horizontal_bias()
        } else {
            self.horizontal_bias()
        };
        Offset::new(
            (center_x * (1.0 + h_bias)).round(),
            (center_y * (1.0 + self.vertical_bias())).round(),
        )
    }

    pub fn is_start(&self, rtl: bool) -> bool {
        let bias = self.horizontal_bias();
        if rtl {
            bias > 0.0
        } else {
            bias < 0.0
        }
    }

    pub fn is_top(&self) -> bool {
        self.vertical_bias() < 0.0
    }

    pub fn name(&self) -> &'static str {
        match self {
            Alignment::TopStart => "top_start",
            Alignment::TopCenter => "top_center",
            Alignment::TopEnd => "top_end",
            Alignment::CenterStart => "center_start",
            Alignment::Center => "center",
            Alignment::CenterEnd => "center_end",
            Alignment::BottomStart => "bottom_start",
            Alignment::BottomCenter => "bottom_center",
            Alignment::BottomEnd => "bottom_end",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "top_start" => Ok(Alignment::TopStart),
            "top_center" => Ok(Alignment::TopCenter),
            "top_end" => Ok(Alignment::TopEnd),
            "center_start" => Ok(Alignment::CenterStart),
            "center" => Ok(Alignment::Center),
            "center_end" => Ok(Alignment::CenterEnd),
            "bottom_start" => Ok(Alignment::BottomStart),
            "bottom_center" => Ok(Alignment::BottomCenter),
            "bottom_end" => Ok(Alignment::BottomEnd),
            _ => Err(format!("unknown alignment '{}'", s)),
        }
    }
}

// =============================================================================
// Base Transform
// =============================================================================

/// Resolve the base transform for content inside a container.
///
/// The content is rotated first (90/270 swap the axes), scaled according to
/// `content_scale`, then placed with `alignment`. Empty sizes resolve to the
/// identity transform.
pub fn resolve_base_transform(
    container_size: IntSize,
    content_size: IntSize,
    content_scale: ContentScale,
    alignment: Alignment,
    rtl: bool,
    rotation: i32,
) -> Transform {
    if container_size.is_empty() || content_size.is_empty() {
        return Transform::ORIGIN;
    }
    let container = container_size.to_size();
    let rotated = rotated_size(content_size, rotation);
    let scale = content_scale.compute_scale_factor(rotated, container);
    let offset = alignment.align(rotated * scale, container, rtl);
    Transform::new(scale, offset, normalize_rotation(rotation))
}
