//! Radar map compositing.
//!
//! A render is a fixed sequence of steps:
//! 1. Resolve the latest radar and lightning timestamps
//! 2. Fetch lightning detections
//! 3. Project the centre and pick the tile grid around it
//! 4. Download every grid tile (basemap opaque, radar at half opacity)
//! 5. Draw distance rings, then lightning markers
//!
//! Upstream failures never abort a render; they only leave parts of the
//! image empty.

use std::time::Instant;

use amesh_common::{GridTile, LightningPoint, Location, TileGrid, TILE_SIZE};
use futures::stream::{self, StreamExt};
use image::RgbaImage;
use projection::Viewport;
use renderer::{
    draw_distance_rings, draw_marker, draw_over, Canvas, Color, Rect, MARKER_COLOR, OPAQUE,
};
use tracing::{debug, info, instrument, warn};

use crate::config::RenderConfig;
use crate::fetcher::HttpFetcher;
use crate::sources::{fetch_latest_timestamps, fetch_lightning, fetch_tile};

/// Opacity of the radar layer over the basemap.
pub const RADAR_OPACITY: u8 = 128;

/// What to render: a centre point, a zoom level and a grid radius.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRenderRequest {
    pub location: Location,
    /// Web Mercator zoom; outside 0..=30 the projection degenerates to (0, 0)
    pub zoom: i32,
    /// Output side is `(2 * tile_radius + 1) * 256` pixels
    pub tile_radius: u32,
}

impl ImageRenderRequest {
    pub fn new(location: Location, zoom: i32, tile_radius: u32) -> Self {
        Self {
            location,
            zoom,
            tile_radius,
        }
    }

    /// Request using the configured zoom and radius.
    pub fn from_config(location: Location, config: &RenderConfig) -> Self {
        Self::new(location, config.zoom, config.tile_radius)
    }

    pub fn canvas_size(&self) -> u32 {
        amesh_common::canvas_size(self.tile_radius)
    }
}

/// Downloaded layers for one grid cell.
struct TileLayers {
    tile: GridTile,
    basemap: RgbaImage,
    radar: Option<RgbaImage>,
}

/// Fetch the basemap, then the radar tile for one cell. A cell whose
/// basemap fails is skipped entirely.
async fn download_tile_layers(
    fetcher: &dyn HttpFetcher,
    basemap_template: &str,
    radar_template: &str,
    tile: GridTile,
) -> Option<TileLayers> {
    let basemap = match fetch_tile(fetcher, basemap_template, tile.coord).await {
        Ok(img) => img,
        Err(e) => {
            warn!(tile = %tile.coord.path(), error = %e, "Skipping basemap tile");
            metrics::counter!("amesh_tile_failures_total", "layer" => "basemap").increment(1);
            return None;
        }
    };

    let radar = match fetch_tile(fetcher, radar_template, tile.coord).await {
        Ok(img) => Some(img),
        Err(e) => {
            warn!(tile = %tile.coord.path(), error = %e, "Skipping radar tile");
            metrics::counter!("amesh_tile_failures_total", "layer" => "radar").increment(1);
            None
        }
    };

    Some(TileLayers {
        tile,
        basemap,
        radar,
    })
}

/// Render the radar image for a request.
///
/// The result is always a canvas of side `(2 * tile_radius + 1) * 256`,
/// white wherever no tile could be drawn.
#[instrument(skip(fetcher, config, request), fields(
    place = %request.location.display_name,
    zoom = request.zoom,
    tile_radius = request.tile_radius
))]
pub async fn render(
    fetcher: &dyn HttpFetcher,
    config: &RenderConfig,
    request: &ImageRenderRequest,
) -> Canvas {
    let start = Instant::now();
    let lat = request.location.latitude;
    let lng = request.location.longitude;

    let timestamps = fetch_latest_timestamps(fetcher, config).await;
    let lightning = fetch_lightning(fetcher, config, timestamps.lightning()).await;

    let size = request.canvas_size();
    let viewport = Viewport::new(lat, lng, request.zoom, size);
    let grid = TileGrid::new(viewport.center_tile(), request.tile_radius);
    debug!(
        center_x = grid.center.x,
        center_y = grid.center.y,
        size = size,
        "Computed tile grid"
    );

    let mut canvas = Canvas::filled(size, size, Color::WHITE);

    let radar_template = config.radar_template_for(timestamps.radar());
    let basemap_template = config.basemap_url_template.as_str();
    let downloads: Vec<Option<TileLayers>> = stream::iter(grid.tiles())
        .map(|tile| download_tile_layers(fetcher, basemap_template, &radar_template, tile))
        .buffer_unordered(config.tile_concurrency.max(1))
        .collect()
        .await;

    // Destination rectangles are disjoint, so completion order is irrelevant
    let mut drawn = 0usize;
    for layers in downloads.into_iter().flatten() {
        let dest = Rect::new(layers.tile.dest_x, layers.tile.dest_y, TILE_SIZE, TILE_SIZE);
        draw_over(&mut canvas, &layers.basemap, dest, OPAQUE);
        if let Some(radar) = &layers.radar {
            draw_over(&mut canvas, radar, dest, RADAR_OPACITY);
        }
        drawn += 1;
    }

    draw_distance_rings(&mut canvas, &viewport, lat, lng);
    draw_lightning(&mut canvas, &viewport, &lightning);

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    metrics::histogram!("amesh_render_duration_ms").record(elapsed_ms);
    info!(
        tiles = drawn,
        total_tiles = grid.side_tiles() * grid.side_tiles(),
        lightning = lightning.len(),
        elapsed_ms = elapsed_ms,
        "Rendered radar image"
    );

    canvas
}

/// Draw one marker per lightning strike.
pub fn draw_lightning(canvas: &mut Canvas, viewport: &Viewport, points: &[LightningPoint]) {
    for point in points {
        draw_marker(canvas, viewport, point.latitude, point.longitude, MARKER_COLOR);
    }
}
