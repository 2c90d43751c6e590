//! Rain radar map rendering.
//!
//! Resolves a place to coordinates, fetches basemap, radar and lightning
//! data from their upstream services and composites them into one PNG.
//!
//! All network access goes through an [`HttpFetcher`] passed in by the
//! caller, so the same pipeline runs against the live services or a
//! [`ScriptedFetcher`] in tests.

pub mod compositor;
pub mod config;
pub mod fetcher;
pub mod geocode;
pub mod sources;

use amesh_common::{AmeshResult, Location, ResultExt};

pub use compositor::{render, ImageRenderRequest, RADAR_OPACITY};
pub use config::{RenderConfig, DEFAULT_PLACE};
pub use fetcher::{FetchRequest, FetchResponse, HttpFetcher, ReqwestFetcher, ScriptedFetcher};
pub use geocode::{geocode, parse_coordinates, resolve_location};
pub use sources::{fetch_latest_timestamps, fetch_lightning, fetch_tile, LayerTimestamps};

/// Render the radar image around `location` with the configured zoom and
/// radius, encoded as PNG.
pub async fn create_image_png(
    fetcher: &dyn HttpFetcher,
    config: &RenderConfig,
    location: &Location,
) -> AmeshResult<Vec<u8>> {
    let request = ImageRenderRequest::from_config(location.clone(), config);
    let canvas = render(fetcher, config, &request).await;
    renderer::encode_canvas(&canvas).context("encoding radar image")
}

/// Upload file name for a rendered image:
/// `amesh_{display name, spaces as underscores}_{unix seconds}.png`.
pub fn generate_file_name(location: &Location, unix_timestamp: i64) -> String {
    format!(
        "amesh_{}_{}.png",
        location.display_name.replace(' ', "_"),
        unix_timestamp
    )
}

/// [`generate_file_name`] stamped with the current time.
pub fn generate_file_name_now(location: &Location) -> String {
    generate_file_name(location, chrono::Utc::now().timestamp())
}
