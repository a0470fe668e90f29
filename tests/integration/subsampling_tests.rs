//! Subsampling engine tests: setup checks, lifecycle, and the full
//! zoom-to-tiles pipeline over a real PNG.

use std::sync::Arc;

use image::ImageFormat;
use tokio::sync::broadcast;

use zoomimage::config::SubsamplingConfig;
use zoomimage::error::SubsamplingError;
use zoomimage::geometry::{IntSize, Offset, Rect, ScaleFactor};
use zoomimage::source::{
    DecoderBackend, ExifOrientation, ImageInfo, ImageRsDecoderFactory, ImageSource,
    MemoryImageSource,
};
use zoomimage::subsampling::{SubsamplingEngine, SubsamplingEvent, ZoomImage};
use zoomimage::tile::TileEvent;
use zoomimage::transform::Transform;
use zoomimage::zoom::{ContinuousTransformType, Viewport};

use super::test_utils::{
    encode_image, encode_png, engine_config, exact_config, top_left_viewport, MockDecoder,
    MockDecoderFactory, MockImageSource,
};

const SQUARE: IntSize = IntSize::new(1000, 1000);

fn source(key: &str) -> Arc<dyn ImageSource> {
    Arc::new(MockImageSource::new(key, bytes::Bytes::from_static(b"mock")))
}

async fn prepare_with(
    engine: &mut SubsamplingEngine,
    decoder: MockDecoder,
    content: IntSize,
) -> Result<ImageInfo, SubsamplingError> {
    let factory = MockDecoderFactory::new(Arc::new(decoder));
    engine.prepare(&factory, source("photo.jpg"), content, SQUARE).await
}

fn drain(rx: &mut broadcast::Receiver<SubsamplingEvent>) -> Vec<SubsamplingEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// =============================================================================
// Setup
// =============================================================================

#[tokio::test]
async fn test_prepare_ready() {
    let mut engine = SubsamplingEngine::new(exact_config());
    let mut rx = engine.subscribe();

    let info = prepare_with(&mut engine, MockDecoder::jpeg(8000, 8000), SQUARE)
        .await
        .unwrap();
    assert_eq!(info.size(), IntSize::new(8000, 8000));
    assert!(engine.is_ready());
    assert_eq!(engine.backend(), Some(DecoderBackend::Custom));
    assert_eq!(engine.grid().unwrap().max_sample_size(), 16);
    assert!(engine.disabled_reason().is_none());

    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [SubsamplingEvent::Ready { image_key, backend: DecoderBackend::Custom, .. }]
            if image_key == "photo.jpg"
    ));
}

#[tokio::test]
async fn test_prepare_source_failure_disables() {
    let mut engine = SubsamplingEngine::new(exact_config());
    let mut rx = engine.subscribe();
    let factory = MockDecoderFactory::new(Arc::new(MockDecoder::jpeg(8000, 8000)));
    let failing = Arc::new(MockImageSource::failing("gone.jpg"));

    let result = engine
        .prepare(&factory, failing.clone(), SQUARE, SQUARE)
        .await;
    assert!(matches!(result, Err(SubsamplingError::Source(_))));
    assert_eq!(failing.open_count(), 1);
    assert!(!engine.is_ready());
    assert!(matches!(engine.disabled_reason(), Some(SubsamplingError::Source(_))));
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [SubsamplingEvent::Disabled { reason: SubsamplingError::Source(_) }]
    ));
}

#[tokio::test]
async fn test_prepare_rejections() {
    let mut engine = SubsamplingEngine::new(exact_config());

    let gif = MockDecoder::new(ImageInfo::new(8000, 8000, "image/gif"));
    assert!(matches!(
        prepare_with(&mut engine, gif, SQUARE).await,
        Err(SubsamplingError::UnsupportedMimeType(mime)) if mime == "image/gif"
    ));

    let small = MockDecoder::jpeg(800, 600);
    assert!(matches!(
        prepare_with(&mut engine, small, IntSize::new(1000, 750)).await,
        Err(SubsamplingError::ImageTooSmall { .. })
    ));

    let square = MockDecoder::jpeg(8000, 8000);
    assert!(matches!(
        prepare_with(&mut engine, square, IntSize::new(1000, 500)).await,
        Err(SubsamplingError::AspectRatioMismatch { .. })
    ));

    let factory = MockDecoderFactory::new(Arc::new(MockDecoder::jpeg(8000, 8000)));
    let result = engine
        .prepare(&factory, source("photo.jpg"), SQUARE, IntSize::ZERO)
        .await;
    assert!(matches!(result, Err(SubsamplingError::NotReady(_))));
    // Rejected before the source is touched
    assert_eq!(factory.create_count(), 0);
    assert!(!engine.is_ready());
}

#[tokio::test]
async fn test_undecodable_bytes_disable_real_backend() {
    let mut engine = SubsamplingEngine::new(exact_config());
    let garbage: Arc<dyn ImageSource> =
        Arc::new(MemoryImageSource::new("notes.txt", &b"not an image"[..]));
    let result = engine
        .prepare(&ImageRsDecoderFactory::new(), garbage, IntSize::new(32, 32), SQUARE)
        .await;
    assert!(matches!(result, Err(SubsamplingError::Decode(_))));

    // JPEG goes through, but a 64px image cannot beat a 32px preview
    let tiny: Arc<dyn ImageSource> = Arc::new(MemoryImageSource::new(
        "tiny.jpg",
        encode_image(64, 48, ImageFormat::Jpeg),
    ));
    let result = engine
        .prepare(&ImageRsDecoderFactory::new(), tiny, IntSize::new(64, 48), SQUARE)
        .await;
    assert!(matches!(result, Err(SubsamplingError::ImageTooSmall { .. })));
}

#[tokio::test]
async fn test_rotated_image_is_tiled_upright() {
    let mut engine = SubsamplingEngine::new(exact_config());
    // Stored 6000x8000, shown 8000x6000
    let decoder = MockDecoder::new(
        ImageInfo::new(6000, 8000, "image/jpeg").with_orientation(ExifOrientation::Rotate90),
    );
    let factory = MockDecoderFactory::new(Arc::new(decoder));
    let content = IntSize::new(1000, 750);
    let info = engine
        .prepare(&factory, source("portrait.jpg"), content, SQUARE)
        .await
        .unwrap();
    assert_eq!(info.size(), IntSize::new(8000, 6000));
    assert_eq!(info.exif_orientation, ExifOrientation::Normal);

    let viewport = Viewport {
        container_size: SQUARE,
        content_size: content,
        content_origin_size: info.size(),
        transform: Transform::new(ScaleFactor::uniform(4.0), Offset::ZERO, 0),
        content_visible_rect: Rect::new(0.0, 0.0, 250.0, 250.0),
        continuous_transform_type: ContinuousTransformType::None,
    };
    assert_eq!(engine.refresh(&viewport, 0), 4);
    engine.wait_for_decodes(0).await;
    assert_eq!(engine.tile_counts().loaded, 4);

    let snapshots = engine.tile_snapshots(0);
    assert_eq!(snapshots.len(), 4);
    for snapshot in &snapshots {
        assert_eq!(snapshot.image.size(), snapshot.bitmap_rect.size());
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_pause_while_transforming() {
    let config = SubsamplingConfig {
        pause_when_transforming: true,
        ..exact_config()
    };
    let mut engine = SubsamplingEngine::new(config);
    prepare_with(&mut engine, MockDecoder::jpeg(8000, 8000), SQUARE)
        .await
        .unwrap();

    let mut viewport = top_left_viewport();
    viewport.continuous_transform_type = ContinuousTransformType::Gesture;
    assert_eq!(engine.refresh(&viewport, 0), 0);
    assert_eq!(engine.sample_size(), None);

    viewport.continuous_transform_type = ContinuousTransformType::None;
    assert_eq!(engine.refresh(&viewport, 0), 4);
    assert_eq!(engine.sample_size(), Some(2));
}

#[tokio::test]
async fn test_stop_and_resume() {
    let mut engine = SubsamplingEngine::new(exact_config());
    let mut rx = engine.subscribe();
    prepare_with(&mut engine, MockDecoder::jpeg(8000, 8000), SQUARE)
        .await
        .unwrap();

    engine.refresh(&top_left_viewport(), 0);
    engine.wait_for_decodes(0).await;
    assert_eq!(engine.tile_counts().loaded, 4);

    engine.set_stopped(true);
    assert!(engine.is_stopped());
    assert_eq!(engine.tile_counts().loaded, 0);
    assert!(engine.tile_snapshots(0).is_empty());
    assert_eq!(engine.refresh(&top_left_viewport(), 0), 0);

    engine.set_stopped(false);
    // Everything comes back from the cache
    assert_eq!(engine.refresh(&top_left_viewport(), 0), 0);
    assert_eq!(engine.tile_counts().loaded, 4);
    assert_eq!(engine.tile_snapshots(0).len(), 4);

    let events = drain(&mut rx);
    let loaded = events
        .iter()
        .filter(|event| matches!(event, SubsamplingEvent::Tile(TileEvent::TileLoaded { .. })))
        .count();
    assert_eq!(loaded, 4);
    let stops: Vec<bool> = events
        .iter()
        .filter_map(|event| match event {
            SubsamplingEvent::Stopped(stopped) => Some(*stopped),
            _ => None,
        })
        .collect();
    assert_eq!(stops, vec![true, false]);
}

#[tokio::test]
async fn test_clear_releases_image() {
    let mut engine = SubsamplingEngine::new(exact_config());
    prepare_with(&mut engine, MockDecoder::jpeg(8000, 8000), SQUARE)
        .await
        .unwrap();
    engine.refresh(&top_left_viewport(), 0);
    engine.wait_for_decodes(0).await;

    engine.clear();
    assert!(!engine.is_ready());
    assert_eq!(engine.refresh(&top_left_viewport(), 0), 0);
    assert!(engine.tile_snapshots(0).is_empty());
}

// =============================================================================
// Full Pipeline
// =============================================================================

#[tokio::test]
async fn test_zoom_image_pipeline() {
    // 2000x1000 panorama previewed at 400x200 in a 400x400 container
    let mut image = ZoomImage::new(engine_config(exact_config()));
    image.zoom_mut().set_container_size(IntSize::new(400, 400));
    let source: Arc<dyn ImageSource> =
        Arc::new(MemoryImageSource::new("panorama.png", encode_png(2000, 1000)));
    let info = image
        .set_image(&ImageRsDecoderFactory::new(), source, IntSize::new(400, 200))
        .await
        .unwrap();
    assert_eq!(info.size(), IntSize::new(2000, 1000));
    assert_eq!(image.subsampling().backend(), Some(DecoderBackend::ImageRs));
    assert_eq!(image.zoom().content_origin_size(), IntSize::new(2000, 1000));

    // At the initial scale the preview is sharp enough
    let frame = image.frame(0);
    assert!(frame.tiles.is_empty());
    assert_eq!(image.subsampling().sample_size(), None);

    let max = image.zoom().max_scale();
    image.zoom_mut().scale_to(max, None, false, 0).unwrap();
    image.frame(0);
    image.subsampling_mut().wait_for_decodes(0).await;
    let frame = image.frame(1);

    assert_eq!(image.subsampling().sample_size(), Some(1));
    assert!(!frame.tiles.is_empty());
    assert!(!frame.animating);
    for tile in &frame.tiles {
        assert_eq!(tile.sample_size, 1);
        assert!(tile.foreground);
        let rect = tile.display_rect;
        assert!(rect.left >= 0.0 && rect.right <= 400.0);
        assert!(rect.top >= 0.0 && rect.bottom <= 200.0);

        // Gradient fixture: red is x mod 256, green is y mod 256
        let pixels = tile.image.pixels().unwrap();
        let pixel = pixels.get_pixel(0, 0);
        assert_eq!(pixel.0[0], (tile.src_rect.left % 256) as u8);
        assert_eq!(pixel.0[1], (tile.src_rect.top % 256) as u8);
    }
    assert_eq!(frame.matrix[0], frame.viewport.transform.scale.scale_x);
}
