//! Tile lifecycle tests: decode scheduling, cancellation, the shared image
//! cache and the reuse pool.
//!
//! Every test drives a [`TileManager`] over an 8000x8000 mock image shown as
//! a 1000x1000 preview with 500x500 tiles, so at scale 4 the manager uses
//! sample size 2 and each tile covers 1000x1000 source pixels.

use std::sync::Arc;
use std::time::Duration;

use zoomimage::config::SubsamplingConfig;
use zoomimage::geometry::{IntRect, IntSize, Rect};
use zoomimage::tile::{
    LruTileImageCache, TileCacheKey, TileCoordinate, TileEvent, TileImagePool, TileManager,
    TileState,
};

use super::test_utils::{
    bottom_right_viewport, exact_config, square_viewport, top_left_viewport, wait_until, Gate,
    MockDecoder,
};

const IMAGE_KEY: &str = "photo.jpg";
const TILE_BYTES: usize = 500 * 500 * 4;

struct Fixture {
    decoder: Arc<MockDecoder>,
    cache: Arc<LruTileImageCache>,
    pool: Arc<TileImagePool>,
}

impl Fixture {
    fn new(decoder: MockDecoder) -> Self {
        let pool = Arc::new(TileImagePool::new());
        let cache = Arc::new(LruTileImageCache::new().with_pool(pool.clone()));
        Self {
            decoder: Arc::new(decoder),
            cache,
            pool,
        }
    }

    fn with_cache_budget(decoder: MockDecoder, bytes: usize) -> Self {
        let pool = Arc::new(TileImagePool::new());
        let cache = Arc::new(LruTileImageCache::with_capacity(bytes).with_pool(pool.clone()));
        Self {
            decoder: Arc::new(decoder),
            cache,
            pool,
        }
    }

    fn manager(&self, config: &SubsamplingConfig) -> TileManager {
        TileManager::new(
            IMAGE_KEY,
            self.decoder.clone(),
            self.cache.clone(),
            self.pool.clone(),
            IntSize::new(500, 500),
            config,
        )
        .unwrap()
    }
}

fn key(left: i32, top: i32) -> TileCacheKey {
    TileCacheKey::new(IMAGE_KEY, IntRect::new(left, top, left + 1000, top + 1000), 2)
}

fn discarded(events: &[TileEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|event| match event {
            TileEvent::DecodeDiscarded { pooled, .. } => Some(*pooled),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Scheduling
// =============================================================================

#[tokio::test]
async fn test_loads_visible_tiles_once() {
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000));
    let mut manager = fixture.manager(&exact_config());

    assert_eq!(manager.refresh(&top_left_viewport(), 0), 4);
    assert_eq!(manager.sample_size(), Some(2));
    // Already loading
    assert_eq!(manager.refresh(&top_left_viewport(), 0), 0);

    manager.wait_for_decodes(0).await;
    assert_eq!(manager.tile_counts().loaded, 4);
    assert_eq!(manager.in_flight_count(), 0);
    // Already loaded
    assert_eq!(manager.refresh(&top_left_viewport(), 0), 0);

    let mut requests = fixture.decoder.requests();
    requests.sort_by_key(|(rect, _)| (rect.top, rect.left));
    let rects: Vec<IntRect> = requests.iter().map(|(rect, _)| *rect).collect();
    assert_eq!(
        rects,
        vec![
            IntRect::new(0, 0, 1000, 1000),
            IntRect::new(1000, 0, 2000, 1000),
            IntRect::new(0, 1000, 1000, 2000),
            IntRect::new(1000, 1000, 2000, 2000),
        ]
    );
    assert!(requests.iter().all(|(_, sample_size)| *sample_size == 2));
    assert!(fixture.cache.is_displayed(&key(0, 0)));

    let events = manager.take_events();
    assert!(matches!(
        events.first(),
        Some(TileEvent::SampleSizeChanged { from: None, to: Some(2) })
    ));
    let loaded = events
        .iter()
        .filter(|event| matches!(event, TileEvent::TileLoaded { .. }))
        .count();
    assert_eq!(loaded, 4);
}

#[tokio::test]
async fn test_preview_scale_needs_no_tiles() {
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000));
    let mut manager = fixture.manager(&exact_config());

    // At scale 1 the 1000px preview is already as sharp as sample size 8
    let started = manager.refresh(&square_viewport(1.0, Rect::new(0.0, 0.0, 1000.0, 1000.0)), 0);
    assert_eq!(started, 0);
    assert_eq!(manager.sample_size(), None);
    assert!(manager.tile_snapshots(0).is_empty());
    assert_eq!(fixture.decoder.decode_count(), 0);
}

#[tokio::test]
async fn test_panning_frees_tiles_that_left_the_view() {
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000));
    let mut manager = fixture.manager(&exact_config());

    manager.refresh(&top_left_viewport(), 0);
    manager.wait_for_decodes(0).await;
    manager.refresh(&bottom_right_viewport(), 0);
    manager.wait_for_decodes(0).await;

    let level = manager.tiles(2);
    let loaded: Vec<TileCoordinate> = level
        .iter()
        .filter(|tile| tile.state() == TileState::Loaded)
        .map(|tile| tile.coordinate())
        .collect();
    assert_eq!(
        loaded,
        vec![
            TileCoordinate::new(6, 6),
            TileCoordinate::new(7, 6),
            TileCoordinate::new(6, 7),
            TileCoordinate::new(7, 7),
        ]
    );
    // Freed tiles stay cached, just no longer pinned
    assert!(fixture.cache.contains(&key(0, 0)));
    assert!(!fixture.cache.is_displayed(&key(0, 0)));
    assert!(fixture.cache.is_displayed(&key(6000, 6000)));
}

/// Load the top-left quarter with its first tile failing.
async fn manager_with_failed_tile(fixture: &Fixture) -> TileManager {
    fixture.decoder.fail_rect(IntRect::new(0, 0, 1000, 1000));
    let mut manager = fixture.manager(&exact_config());

    manager.refresh(&top_left_viewport(), 0);
    manager.wait_for_decodes(0).await;
    let counts = manager.tile_counts();
    assert_eq!((counts.loaded, counts.failed), (3, 1));
    assert!(manager.take_events().iter().any(|event| matches!(
        event,
        TileEvent::TileFailed { coordinate, sample_size: 2, .. }
            if *coordinate == TileCoordinate::new(0, 0)
    )));
    assert!(!fixture.cache.contains(&key(0, 0)));
    manager
}

#[tokio::test]
async fn test_failed_tile_waits_for_a_viewport_change() {
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000));
    let mut manager = manager_with_failed_tile(&fixture).await;

    // Every frame refreshes with the same viewport
    for frame in 1..=5 {
        assert_eq!(manager.refresh(&top_left_viewport(), frame), 0);
    }
    manager.wait_for_decodes(5).await;
    assert_eq!(fixture.decoder.decode_count(), 4);
    assert_eq!(manager.tile_counts().failed, 1);
}

#[tokio::test]
async fn test_failed_tile_is_retried_when_the_viewport_changes() {
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000));
    let mut manager = manager_with_failed_tile(&fixture).await;
    fixture.decoder.heal();

    // A small pan keeps the same four tiles in view
    let panned = square_viewport(4.0, Rect::new(0.0, 0.0, 250.0, 240.0));
    assert_eq!(manager.refresh(&panned, 0), 1);
    manager.wait_for_decodes(0).await;
    assert_eq!(manager.tile_counts().loaded, 4);
    assert_eq!(manager.tile_counts().failed, 0);
    assert_eq!(fixture.decoder.decode_count(), 5);
}

#[tokio::test]
async fn test_fade_in_runs_on_the_frame_clock() {
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000));
    let config = SubsamplingConfig {
        prefetch_tiles: 0.0,
        tile_animation_duration_ms: 200,
        ..SubsamplingConfig::default()
    };
    let mut manager = fixture.manager(&config);

    manager.refresh(&top_left_viewport(), 1000);
    manager.wait_for_decodes(1000).await;
    assert!(manager.is_animating());

    let start = manager.tile_snapshots(1000);
    assert_eq!(start.len(), 4);
    assert!(start.iter().all(|tile| tile.alpha == 0));

    let middle = manager.tile_snapshots(1100);
    assert!(middle.iter().all(|tile| tile.alpha > 0 && tile.alpha < 255));

    let end = manager.tile_snapshots(1200);
    assert!(end.iter().all(|tile| tile.alpha == 255));
    assert!(!manager.is_animating());
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_freed_tiles_cancel_their_decodes() {
    let gate = Gate::new();
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000).with_gate(gate.clone()));
    let config = SubsamplingConfig {
        decode_parallelism: 1,
        ..exact_config()
    };
    let mut manager = fixture.manager(&config);

    // Left column of the top-left quarter: two tiles, one decoding at a time
    let viewport = square_viewport(4.0, Rect::new(0.0, 0.0, 125.0, 250.0));
    assert_eq!(manager.refresh(&viewport, 0), 2);
    let decoder = fixture.decoder.clone();
    wait_until(|| decoder.requests().len() == 1).await;

    manager.free_all();
    assert_eq!(manager.in_flight_count(), 0);
    gate.open();

    // The running decode still reports back, and is discarded
    let applied = tokio::time::timeout(Duration::from_secs(5), manager.next_decode_result(0))
        .await
        .unwrap();
    assert!(!applied);
    tokio::time::sleep(Duration::from_millis(100)).await;
    manager.apply_decode_results(0);

    // The queued decode never ran
    assert_eq!(fixture.decoder.decode_count(), 1);
    assert!(fixture.cache.is_empty());
    assert_eq!(fixture.pool.len(), 1);
    assert_eq!(discarded(&manager.take_events()), vec![true]);
    assert_eq!(manager.tile_counts().loaded, 0);
}

#[tokio::test]
async fn test_superseded_viewport_results_go_to_the_pool() {
    let gate = Gate::new();
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000).with_gate(gate.clone()));
    let config = SubsamplingConfig {
        decode_parallelism: 2,
        ..exact_config()
    };
    let mut manager = fixture.manager(&config);

    assert_eq!(manager.refresh(&top_left_viewport(), 0), 4);
    let decoder = fixture.decoder.clone();
    wait_until(|| decoder.requests().len() == 2).await;

    assert_eq!(manager.refresh(&bottom_right_viewport(), 0), 4);
    gate.open();
    manager.wait_for_decodes(0).await;
    wait_until(|| decoder.decode_count() == 6).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    manager.apply_decode_results(0);

    // Two stale decodes ran, two queued ones were skipped
    assert_eq!(fixture.decoder.decode_count(), 6);
    assert_eq!(discarded(&manager.take_events()), vec![true, true]);
    assert!(!fixture.cache.contains(&key(0, 0)));
    assert!(!fixture.cache.contains(&key(1000, 0)));
    assert_eq!(fixture.cache.len(), 4);
    assert!(fixture.cache.contains(&key(7000, 7000)));
    assert_eq!(manager.tile_counts().loaded, 4);
}

#[tokio::test]
async fn test_requested_again_tiles_join_their_cancelled_decodes() {
    let gate = Gate::new();
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000).with_gate(gate.clone()));
    let config = SubsamplingConfig {
        decode_parallelism: 4,
        ..exact_config()
    };
    let mut manager = fixture.manager(&config);

    assert_eq!(manager.refresh(&top_left_viewport(), 0), 4);
    let decoder = fixture.decoder.clone();
    wait_until(|| decoder.requests().len() == 4).await;

    // Pan away while the top-left decodes are running, then straight back
    assert_eq!(manager.refresh(&bottom_right_viewport(), 0), 4);
    assert_eq!(manager.refresh(&top_left_viewport(), 0), 0);
    assert_eq!(manager.in_flight_count(), 4);
    let first_tile = decoder
        .requests()
        .iter()
        .filter(|(rect, _)| *rect == IntRect::new(0, 0, 1000, 1000))
        .count();
    assert_eq!(first_tile, 1);

    gate.open();
    manager.wait_for_decodes(0).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    manager.apply_decode_results(0);

    // The bottom-right decodes gave up while queued
    assert_eq!(fixture.decoder.decode_count(), 4);
    assert_eq!(manager.tile_counts().loaded, 4);
    assert!(discarded(&manager.take_events()).is_empty());
    assert!(fixture.cache.is_displayed(&key(0, 0)));
    assert!(!fixture.cache.contains(&key(7000, 7000)));
}

#[tokio::test]
async fn test_oversized_results_are_cropped() {
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000).with_oversize(3));
    let mut manager = fixture.manager(&exact_config());

    manager.refresh(&top_left_viewport(), 0);
    manager.wait_for_decodes(0).await;

    let snapshots = manager.tile_snapshots(0);
    assert_eq!(snapshots.len(), 4);
    for snapshot in &snapshots {
        assert_eq!(snapshot.image.size(), IntSize::new(503, 503));
        assert_eq!(snapshot.bitmap_rect, IntRect::new(0, 0, 500, 500));
        assert_eq!(snapshot.display_rect.width(), 125.0);
    }
}

#[tokio::test]
async fn test_stale_oversized_result_is_not_pooled() {
    let gate = Gate::new();
    let fixture = Fixture::new(
        MockDecoder::jpeg(8000, 8000)
            .with_gate(gate.clone())
            .with_oversize(3),
    );
    let config = SubsamplingConfig {
        decode_parallelism: 1,
        ..exact_config()
    };
    let mut manager = fixture.manager(&config);

    manager.refresh(&square_viewport(4.0, Rect::new(0.0, 0.0, 125.0, 125.0)), 0);
    let decoder = fixture.decoder.clone();
    wait_until(|| decoder.requests().len() == 1).await;
    manager.free_all();
    gate.open();

    let applied = tokio::time::timeout(Duration::from_secs(5), manager.next_decode_result(0))
        .await
        .unwrap();
    assert!(!applied);
    assert_eq!(discarded(&manager.take_events()), vec![false]);
    assert!(fixture.pool.is_empty());
}

// =============================================================================
// Background Tiles
// =============================================================================

#[tokio::test]
async fn test_coarse_tiles_cover_until_fine_tiles_load() {
    let gate = Gate::new();
    gate.open();
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000).with_gate(gate.clone()));
    let mut manager = fixture.manager(&exact_config());

    // Scale 2 uses sample size 4: 2000px tiles
    assert_eq!(
        manager.refresh(&square_viewport(2.0, Rect::new(0.0, 0.0, 500.0, 500.0)), 0),
        4
    );
    manager.wait_for_decodes(0).await;
    assert_eq!(manager.sample_size(), Some(4));

    gate.close();
    assert_eq!(manager.refresh(&top_left_viewport(), 0), 4);

    // Only the coarse tile under the visible area survives, drawn behind
    let snapshots = manager.tile_snapshots(0);
    assert_eq!(snapshots.len(), 1);
    let background = &snapshots[0];
    assert!(!background.foreground);
    assert_eq!(background.sample_size, 4);
    assert_eq!(background.coordinate, TileCoordinate::new(0, 0));
    assert_eq!(background.display_rect, Rect::new(0.0, 0.0, 250.0, 250.0));

    gate.open();
    manager.wait_for_decodes(0).await;
    let snapshots = manager.tile_snapshots(0);
    assert_eq!(snapshots.len(), 4);
    assert!(snapshots.iter().all(|tile| tile.foreground && tile.sample_size == 2));
    assert!(manager
        .tiles(4)
        .iter()
        .all(|tile| tile.state() == TileState::Absent));
}

#[tokio::test]
async fn test_background_tiles_can_be_disabled() {
    let gate = Gate::new();
    gate.open();
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000).with_gate(gate.clone()));
    let config = SubsamplingConfig {
        disable_background_tiles: true,
        ..exact_config()
    };
    let mut manager = fixture.manager(&config);

    manager.refresh(&square_viewport(2.0, Rect::new(0.0, 0.0, 500.0, 500.0)), 0);
    manager.wait_for_decodes(0).await;

    gate.close();
    manager.refresh(&top_left_viewport(), 0);
    assert!(manager.tile_snapshots(0).is_empty());
    assert!(manager
        .tiles(4)
        .iter()
        .all(|tile| tile.state() == TileState::Absent));

    gate.open();
    manager.wait_for_decodes(0).await;
    assert_eq!(manager.tile_snapshots(0).len(), 4);
}

// =============================================================================
// Cache and Pool
// =============================================================================

#[tokio::test]
async fn test_second_manager_hits_shared_cache() {
    let fixture = Fixture::new(MockDecoder::jpeg(8000, 8000));
    let config = SubsamplingConfig {
        prefetch_tiles: 0.0,
        ..SubsamplingConfig::default()
    };

    {
        let mut first = fixture.manager(&config);
        first.refresh(&top_left_viewport(), 0);
        first.wait_for_decodes(0).await;
    }
    assert_eq!(fixture.cache.len(), 4);
    assert!(!fixture.cache.is_displayed(&key(0, 0)));

    let mut second = fixture.manager(&config);
    assert_eq!(second.refresh(&top_left_viewport(), 0), 0);
    assert_eq!(second.tile_counts().loaded, 4);
    assert_eq!(fixture.decoder.decode_count(), 4);
    assert!(fixture.cache.is_displayed(&key(0, 0)));

    // Cache hits show up without a fade
    let snapshots = second.tile_snapshots(0);
    assert!(snapshots.iter().all(|tile| tile.alpha == 255));
}

#[tokio::test]
async fn test_evicted_images_are_reused() {
    // Room for a single tile once nothing is displayed
    let fixture = Fixture::with_cache_budget(MockDecoder::jpeg(8000, 8000), 1024 * 1024);
    let mut manager = fixture.manager(&exact_config());

    manager.refresh(&top_left_viewport(), 0);
    manager.wait_for_decodes(0).await;
    // Displayed tiles are never evicted, even over budget
    assert_eq!(fixture.cache.len(), 4);
    assert_eq!(fixture.cache.size(), 4 * TILE_BYTES);

    manager.free_all();
    assert_eq!(fixture.cache.len(), 1);
    assert_eq!(fixture.pool.len(), 3);

    manager.refresh(&bottom_right_viewport(), 0);
    manager.wait_for_decodes(0).await;
    assert_eq!(manager.tile_counts().loaded, 4);
    assert!(fixture.decoder.reused_count() >= 3);
}
