//! zoomimage - inspect huge images and plan their tile pyramids.
//!
//! This binary exercises the library engines from the command line.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zoomimage::{
    config::{Cli, Command, EngineConfig, GridConfig, InspectConfig, SimulateConfig},
    geometry::IntSize,
    source::{DecoderFactory, FileImageSource, ImageInfo, ImageRsDecoderFactory, ImageSource},
    subsampling::ZoomImage,
    tile::{calculate_preferred_tile_size, TileGridMap},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.engine_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Inspect(args) => run_inspect(args).await,
        Command::Grid(args) => run_grid(args).await,
        Command::Simulate(args) => run_simulate(args, config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "zoomimage=debug"
    } else {
        "zoomimage=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Read the header of an image file.
async fn read_info(path: &std::path::Path) -> Result<ImageInfo, String> {
    let source: Arc<dyn ImageSource> = Arc::new(FileImageSource::new(path));
    let decoder = ImageRsDecoderFactory::new()
        .create(source)
        .await
        .map_err(|e| e.to_string())?;
    let info = decoder.image_info().clone();
    if info.exif_orientation.swaps_axes() {
        info!(raw = %info.size(), upright = %info.display_size(), "Image is stored rotated");
    }
    Ok(info)
}

fn print_json(value: &impl serde::Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Inspect Command
// =============================================================================

async fn run_inspect(args: InspectConfig) -> ExitCode {
    let info = match read_info(&args.path).await {
        Ok(info) => info,
        Err(e) => {
            error!("Cannot read {}: {}", args.path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        let json = serde_json::json!({
            "path": args.path.display().to_string(),
            "width": info.width,
            "height": info.height,
            "display_size": info.display_size().to_string(),
            "mime_type": info.mime_type,
            "exif_orientation": info.exif_orientation.to_exif(),
        });
        return print_json(&json);
    }

    println!("{}", args.path.display());
    println!("  Size:        {}x{}", info.width, info.height);
    println!("  Displayed:   {}", info.display_size());
    println!("  Mime type:   {}", info.mime_type);
    println!("  Orientation: {}", info.exif_orientation);
    ExitCode::SUCCESS
}

// =============================================================================
// Grid Command
// =============================================================================

async fn run_grid(args: GridConfig) -> ExitCode {
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let image_size = match (args.image_size, &args.path) {
        (Some(size), _) => size,
        (None, Some(path)) => match read_info(path).await {
            Ok(info) => info.display_size(),
            Err(e) => {
                error!("Cannot read {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        (None, None) => return ExitCode::FAILURE,
    };

    let tile_size = calculate_preferred_tile_size(args.container);
    let grid = TileGridMap::new(image_size, tile_size);

    if args.json {
        return print_json(&grid);
    }

    println!("Image {} in container {}", image_size, args.container);
    println!("Preferred tile size {}", tile_size);
    println!();
    println!("  sample   grid      tile (source px)   tiles");
    for level in grid.levels() {
        println!(
            "  {:>6}   {:<8}  {:<17}  {:>5}",
            level.sample_size,
            format!("{}x{}", level.columns, level.rows),
            level.tile_src_size.to_string(),
            level.tile_count()
        );
    }
    ExitCode::SUCCESS
}

// =============================================================================
// Simulate Command
// =============================================================================

async fn run_simulate(args: SimulateConfig, mut config: EngineConfig) -> ExitCode {
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }
    if let Some(bytes) = args.tile_cache {
        config.subsampling.tile_cache_bytes = bytes;
    }

    let info = match read_info(&args.path).await {
        Ok(info) => info,
        Err(e) => {
            error!("Cannot read {}: {}", args.path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let content_size = preview_size(info.display_size(), args.container);

    let mut image = ZoomImage::new(config);
    let zoom = image.zoom_mut();
    zoom.set_container_size(args.container);
    zoom.set_content_scale(args.content_scale);
    zoom.set_alignment(args.alignment);
    if let Err(e) = zoom.rotate_to(args.rotation) {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let source: Arc<dyn ImageSource> = Arc::new(FileImageSource::new(&args.path));
    let factory = ImageRsDecoderFactory::new();
    let subsampling = match image.set_image(&factory, source, content_size).await {
        Ok(_) => None,
        Err(reason) => {
            warn!("Tiles disabled, showing preview only: {}", reason);
            Some(reason.to_string())
        }
    };

    let clock = Instant::now();
    let now = || clock.elapsed().as_millis() as u64;

    let target = image.zoom().min_scale() * args.scale;
    if let Err(e) = image.zoom_mut().scale_to(target, None, false, now()) {
        error!("Cannot zoom: {}", e);
        return ExitCode::FAILURE;
    }

    image.frame(now());
    let decoded = image.subsampling_mut().wait_for_decodes(now()).await;
    let frame = image.frame(now());
    let elapsed_ms = now();

    let zoom = image.zoom();
    let engine = image.subsampling();
    let counts = engine.tile_counts();

    if args.json {
        let json = serde_json::json!({
            "image": info.display_size().to_string(),
            "content": content_size.to_string(),
            "container": args.container.to_string(),
            "scale": zoom.scale(),
            "scales": [zoom.min_scale(), zoom.medium_scale(), zoom.max_scale()],
            "visible_rect": zoom.content_visible_rect(),
            "sample_size": engine.sample_size(),
            "disabled": subsampling,
            "tiles": counts,
            "decoded": decoded,
            "frame": frame,
            "elapsed_ms": elapsed_ms,
        });
        return print_json(&json);
    }

    println!("Image {} as {} preview in {}", info.display_size(), content_size, args.container);
    println!(
        "  Scales:      min {:.3}  medium {:.3}  max {:.3}",
        zoom.min_scale(),
        zoom.medium_scale(),
        zoom.max_scale()
    );
    println!("  Scale:       {:.3}", zoom.scale());
    println!("  Visible:     {:?}", zoom.content_visible_rect());
    match (&subsampling, engine.sample_size()) {
        (Some(reason), _) => println!("  Tiles:       disabled ({})", reason),
        (None, None) => println!("  Tiles:       none, preview is sharp enough"),
        (None, Some(sample_size)) => {
            println!("  Sample size: {}", sample_size);
            println!(
                "  Tiles:       {} loaded, {} failed, {} drawn",
                counts.loaded,
                counts.failed,
                frame.tiles.len()
            );
        }
    }
    println!("  Decoded in:  {} ms", elapsed_ms);
    ExitCode::SUCCESS
}

/// Size of the preview a viewer would show: the image scaled down to fit
/// the container, never up.
fn preview_size(image: IntSize, container: IntSize) -> IntSize {
    let scale = (container.width as f32 / image.width as f32)
        .min(container.height as f32 / image.height as f32)
        .min(1.0);
    IntSize::new(
        ((image.width as f32 * scale).round() as u32).max(1),
        ((image.height as f32 * scale).round() as u32).max(1),
    )
}
