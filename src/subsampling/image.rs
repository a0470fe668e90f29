use std::sync::Arc;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::SubsamplingError;
use crate::geometry::IntSize;
use crate::source::{DecoderFactory, ImageInfo, ImageSource};
use crate::tile::TileSnapshot;
use crate::zoom::{Viewport, ZoomableEngine};

use super::engine::SubsamplingEngine;

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub viewport: Viewport,
    /// Row-major 2x3 affine mapping content to container coordinates
    pub matrix: [f32; 6],
    pub tiles: Vec<TileSnapshot>,
    /// True when another frame should be scheduled
    pub animating: bool,
}

/// One zoomable image: the zoom engine plus its subsampling engine.
pub struct ZoomImage {
    zoom: ZoomableEngine,
    subsampling: SubsamplingEngine,
}

impl ZoomImage {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            zoom: ZoomableEngine::new(config.zoom),
            subsampling: SubsamplingEngine::new(config.subsampling),
        }
    }

    /// Combine existing engines, e.g. one sharing a cache with other images.
    pub fn from_parts(zoom: ZoomableEngine, subsampling: SubsamplingEngine) -> Self {
        Self { zoom, subsampling }
    }

    pub fn zoom(&self) -> &ZoomableEngine {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomableEngine {
        &mut self.zoom
    }

    pub fn subsampling(&self) -> &SubsamplingEngine {
        &self.subsampling
    }

    pub fn subsampling_mut(&mut self) -> &mut SubsamplingEngine {
        &mut self.subsampling
    }

    /// Show a preview of `content_size` and try to back it with tiles from
    /// `source`. The container size must be set first.
    ///
    /// A subsampling error leaves zoom working on the preview alone.
    pub async fn set_image(
        &mut self,
        factory: &dyn DecoderFactory,
        source: Arc<dyn ImageSource>,
        content_size: IntSize,
    ) -> Result<ImageInfo, SubsamplingError> {
        self.zoom.set_content_size(content_size);
        let container_size = self.zoom.container_size();
        let info = self
            .subsampling
            .prepare(factory, source, content_size, container_size)
            .await?;
        self.zoom.set_content_origin_size(info.size());
        Ok(info)
    }

    /// Advance animations, apply finished decodes, refresh tiles, and
    /// snapshot the result.
    pub fn frame(&mut self, now_ms: u64) -> Frame {
        let zoom_animating = self.zoom.tick(now_ms);
        let viewport = self.zoom.viewport();
        self.subsampling.refresh(&viewport, now_ms);
        let tiles = self.subsampling.tile_snapshots(now_ms);
        Frame {
            viewport,
            matrix: viewport.transform.to_matrix(viewport.content_size),
            tiles,
            animating: zoom_animating || self.subsampling.is_animating(),
        }
    }
}
