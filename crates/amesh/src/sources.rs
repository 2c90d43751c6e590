//! Remote data sources feeding the compositor.
//!
//! - Timestamp discovery over the nowcast `targetTimes` indexes
//! - Lightning detections (GeoJSON)
//! - Basemap and radar tile images
//!
//! Timestamp and lightning failures degrade to "no data"; tile failures are
//! returned so the compositor can skip the one tile.

use std::collections::{BTreeMap, BTreeSet};

use amesh_common::{AmeshError, AmeshResult, LightningPoint, ResultExt, TileCoord};
use futures::future::join_all;
use image::RgbaImage;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::{RenderConfig, LIGHTNING_LAYER, RADAR_LAYER};
use crate::fetcher::{FetchRequest, HttpFetcher};

/// One record of a `targetTimes_N*.json` index.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeIndexRecord {
    pub basetime: String,
    pub validtime: String,
    #[serde(default)]
    pub elements: Vec<String>,
}

/// Latest observed timestamp per data layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerTimestamps {
    latest: BTreeMap<String, String>,
}

impl LayerTimestamps {
    /// Merge index records into per-layer latest timestamps.
    ///
    /// Every layer named anywhere gets an entry. Its value is the greatest
    /// `basetime` among records where `basetime == validtime` that list the
    /// layer, or `""` when no such record exists.
    pub fn from_records(records: &[TimeIndexRecord]) -> Self {
        let layers: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.elements.iter().map(String::as_str))
            .collect();

        let latest = layers
            .into_iter()
            .map(|layer| {
                let newest = records
                    .iter()
                    .filter(|r| r.basetime == r.validtime)
                    .filter(|r| r.elements.iter().any(|e| e == layer))
                    .map(|r| r.basetime.as_str())
                    .max()
                    .unwrap_or("");
                (layer.to_string(), newest.to_string())
            })
            .collect();

        Self { latest }
    }

    /// Latest timestamp for a layer, `""` when unknown.
    pub fn latest(&self, layer: &str) -> &str {
        self.latest.get(layer).map(String::as_str).unwrap_or("")
    }

    pub fn radar(&self) -> &str {
        self.latest(RADAR_LAYER)
    }

    pub fn lightning(&self) -> &str {
        self.latest(LIGHTNING_LAYER)
    }

    pub fn layers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.latest.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

async fn fetch_index(
    fetcher: &dyn HttpFetcher,
    url: &str,
) -> AmeshResult<Vec<TimeIndexRecord>> {
    let response = fetcher.fetch(&FetchRequest::get(url)).await?;
    if !response.is_success() {
        return Err(AmeshError::UpstreamUnavailable(format!(
            "timestamp index answered {}",
            response.status
        )));
    }
    let records = serde_json::from_slice(&response.body)?;
    Ok(records)
}

/// Poll every timestamp index concurrently and merge the results.
///
/// Indexes that fail to fetch or decode are skipped.
#[instrument(skip(fetcher, config))]
pub async fn fetch_latest_timestamps(
    fetcher: &dyn HttpFetcher,
    config: &RenderConfig,
) -> LayerTimestamps {
    let results = join_all(
        config
            .timestamp_index_urls
            .iter()
            .map(|url| fetch_index(fetcher, url)),
    )
    .await;

    let mut records = Vec::new();
    for (url, result) in config.timestamp_index_urls.iter().zip(results) {
        match result {
            Ok(mut batch) => {
                debug!(url = %url, count = batch.len(), "Fetched timestamp index");
                records.append(&mut batch);
            }
            Err(e) => warn!(url = %url, error = %e, "Skipping timestamp index"),
        }
    }

    let timestamps = LayerTimestamps::from_records(&records);
    info!(
        radar = timestamps.radar(),
        lightning = timestamps.lightning(),
        "Resolved layer timestamps"
    );
    timestamps
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(rename = "type", default)]
    kind: i64,
}

/// Decode a lightning GeoJSON document.
///
/// Coordinates are `[lng, lat, ...]`; anything past the second value is
/// ignored and features with fewer than two values are skipped.
pub fn parse_lightning(body: &[u8]) -> AmeshResult<Vec<LightningPoint>> {
    let collection: FeatureCollection = serde_json::from_slice(body)?;
    Ok(collection
        .features
        .into_iter()
        .filter_map(|f| match f.geometry.coordinates.as_slice() {
            [lng, lat, ..] => Some(LightningPoint {
                latitude: *lat,
                longitude: *lng,
                kind: f.properties.kind,
            }),
            _ => None,
        })
        .collect())
}

async fn try_fetch_lightning(
    fetcher: &dyn HttpFetcher,
    url: &str,
) -> AmeshResult<Vec<LightningPoint>> {
    let response = fetcher.fetch(&FetchRequest::get(url)).await?;
    if !response.is_success() {
        debug!(url = %url, status = response.status, "No lightning data");
        return Ok(Vec::new());
    }
    parse_lightning(&response.body)
}

/// Lightning detections for a `liden` timestamp. Any failure yields an
/// empty list.
#[instrument(skip(fetcher, config))]
pub async fn fetch_lightning(
    fetcher: &dyn HttpFetcher,
    config: &RenderConfig,
    timestamp: &str,
) -> Vec<LightningPoint> {
    let url = config.lightning_url_for(timestamp);
    match try_fetch_lightning(fetcher, &url).await {
        Ok(points) => {
            debug!(count = points.len(), "Fetched lightning points");
            points
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to fetch lightning data");
            Vec::new()
        }
    }
}

/// Download and decode one tile from an XYZ URL template.
pub async fn fetch_tile(
    fetcher: &dyn HttpFetcher,
    template: &str,
    coord: TileCoord,
) -> AmeshResult<RgbaImage> {
    let url = coord.fill_template(template);
    let response = fetcher.fetch(&FetchRequest::get(&url)).await?;
    if !response.is_success() {
        return Err(AmeshError::UpstreamUnavailable(format!(
            "tile {} answered {}",
            url, response.status
        )));
    }
    renderer::decode_image(&response.body).with_context(|| format!("decoding tile {}", url))
}
