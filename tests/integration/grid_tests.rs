//! Tile grid planning tests.

use zoomimage::geometry::{IntRect, IntSize};
use zoomimage::tile::{
    calculate_preferred_tile_size, find_sample_size, preview_suffices, TileGridMap,
};

fn assert_covers_exactly(grid: &TileGridMap) {
    let image = grid.image_size;
    for level in grid.levels() {
        let area: u64 = level
            .tiles
            .iter()
            .map(|tile| tile.src_rect.width() as u64 * tile.src_rect.height() as u64)
            .sum();
        assert_eq!(
            area,
            image.width as u64 * image.height as u64,
            "level {} does not tile the image",
            level.sample_size
        );
        for tile in &level.tiles {
            assert!(image.to_rect().contains_rect(&tile.src_rect));
            assert!(!tile.src_rect.is_empty());
        }
    }
}

#[test]
fn test_square_grid_levels() {
    // 8000x8000 image in a 1080x1920 portrait container
    let container = IntSize::new(1080, 1920);
    let tile_size = calculate_preferred_tile_size(container);
    assert_eq!(tile_size, IntSize::new(540, 960));

    let grid = TileGridMap::new(IntSize::new(8000, 8000), tile_size);
    assert_eq!(grid.describe(), "16:1x1, 8:2x2, 4:4x3, 2:8x5, 1:15x9");
    assert_eq!(grid.max_sample_size(), 16);

    let finest = grid.level(1).unwrap();
    assert_eq!(finest.tile_count(), 15 * 9);
    assert_covers_exactly(&grid);
}

#[test]
fn test_panorama_grid() {
    let grid = TileGridMap::new(IntSize::new(30000, 926), IntSize::new(500, 500));
    let samples: Vec<u32> = grid.levels().map(|level| level.sample_size).collect();
    assert_eq!(samples, vec![64, 32, 16, 8, 4, 2, 1]);

    let finest = grid.level(1).unwrap();
    assert_eq!((finest.columns, finest.rows), (60, 2));
    assert_eq!(finest.tile_src_size, IntSize::new(500, 463));

    let coarsest = grid.level(64).unwrap();
    assert_eq!((coarsest.columns, coarsest.rows), (1, 1));
    assert_eq!(coarsest.tiles[0].src_rect, IntRect::new(0, 0, 30000, 926));
    assert_covers_exactly(&grid);
}

#[test]
fn test_decoded_tiles_stay_near_preferred_size() {
    let tile_size = IntSize::new(540, 960);
    let grid = TileGridMap::new(IntSize::new(7557, 5669), tile_size);
    for level in grid.levels() {
        for tile in &level.tiles {
            let decoded = tile.decoded_size();
            assert!(decoded.width <= tile_size.width, "{} at {}", decoded, level.sample_size);
            assert!(decoded.height <= tile_size.height, "{} at {}", decoded, level.sample_size);
        }
    }
}

#[test]
fn test_visible_rect_lookup() {
    let grid = TileGridMap::new(IntSize::new(8000, 8000), IntSize::new(500, 500));
    let level = grid.level(2).unwrap();
    assert_eq!(level.tile_src_size, IntSize::new(1000, 1000));

    let hits = level.intersecting(&IntRect::new(0, 0, 2000, 2000));
    assert_eq!(hits.len(), 4);
    let hits = level.intersecting(&IntRect::new(999, 999, 1001, 1001));
    assert_eq!(hits.len(), 4);
    assert!(level.intersecting(&IntRect::ZERO).is_empty());
}

#[test]
fn test_sample_size_follows_scale() {
    let image = IntSize::new(8000, 8000);
    let content = IntSize::new(1000, 1000);
    let grid = TileGridMap::new(image, IntSize::new(500, 500));
    let max = grid.max_sample_size();

    assert_eq!(find_sample_size(image, content, 1.0, max), 8);
    assert_eq!(find_sample_size(image, content, 2.0, max), 4);
    assert_eq!(find_sample_size(image, content, 4.0, max), 2);
    assert_eq!(find_sample_size(image, content, 8.0, max), 1);
    // Never past the coarsest level
    assert_eq!(find_sample_size(image, content, 0.001, max), max);

    assert!(preview_suffices(image, content, 8));
    assert!(!preview_suffices(image, content, 4));
}

#[test]
fn test_empty_inputs_plan_nothing() {
    assert!(TileGridMap::new(IntSize::ZERO, IntSize::new(500, 500)).is_empty());
    assert!(TileGridMap::new(IntSize::new(100, 100), IntSize::ZERO).is_empty());
}
