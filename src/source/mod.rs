//! Image sources and region decoders.
//!
//! The subsampling engine depends only on two capabilities:
//!
//! - [`ImageSource`]: a re-openable stream of encoded bytes with a stable key
//! - [`RegionDecoder`]: decodes a rectangle at a power-of-two sample size
//!
//! Decoders are created by a [`DecoderFactory`], tagged with the
//! [`DecoderBackend`] it implements. The crate ships one backend built on the
//! `image` crate ([`ImageRsDecoderFactory`]) and the [`ExifRegionDecoder`]
//! wrapper that presents EXIF-oriented images upright.
//!
//! Decoded pixels travel as [`TileImage`], an opaque handle exposing only
//! `width`, `height`, `byte_count` and `recycle`.

mod image_rs;
mod info;
mod orientation;
mod tile_image;
mod traits;

pub use image_rs::{read_exif_orientation, ImageRsDecoderFactory, ImageRsRegionDecoder};
pub use info::{is_region_decodable, ExifOrientation, ImageInfo, REGION_DECODABLE_MIME_TYPES};
pub use orientation::ExifRegionDecoder;
pub use tile_image::TileImage;
pub use traits::{
    DecoderBackend, DecoderFactory, FileImageSource, ImageSource, MemoryImageSource,
    RegionDecoder,
};
