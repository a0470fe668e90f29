//! Subsampling: sharp tiles for large images.
//!
//! [`SubsamplingEngine`] decides whether an image benefits from tiles and
//! drives a [`TileManager`](crate::tile::TileManager) from zoom viewports.
//! [`ZoomImage`] pairs it with a [`ZoomableEngine`](crate::zoom::ZoomableEngine)
//! and produces one [`Frame`] per display refresh.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zoomimage::config::EngineConfig;
//! use zoomimage::geometry::IntSize;
//! use zoomimage::source::{FileImageSource, ImageRsDecoderFactory};
//! use zoomimage::subsampling::ZoomImage;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut image = ZoomImage::new(EngineConfig::default());
//!     image.zoom_mut().set_container_size(IntSize::new(1080, 1920));
//!
//!     let source = Arc::new(FileImageSource::new("panorama.jpg"));
//!     let factory = ImageRsDecoderFactory::new();
//!     if let Err(reason) = image.set_image(&factory, source, IntSize::new(1080, 33)).await {
//!         println!("Showing preview only: {}", reason);
//!     }
//!
//!     let frame = image.frame(0);
//!     println!("{} tiles", frame.tiles.len());
//! }
//! ```

mod engine;
mod image;

pub use engine::{check_subsampling, SubsamplingEngine, SubsamplingEvent, ASPECT_RATIO_TOLERANCE};
pub use image::{Frame, ZoomImage};
