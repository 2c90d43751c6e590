//! Render pipeline configuration.

use std::time::Duration;

use tracing::warn;

/// Placeholder for the nowcast timestamp in JMA URL templates.
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

/// Place used when a command or request names no place.
pub const DEFAULT_PLACE: &str = "東京";

/// Layer carrying the high-resolution precipitation nowcast.
pub const RADAR_LAYER: &str = "hrpns_nd";

/// Layer carrying lightning detections.
pub const LIGHTNING_LAYER: &str = "liden";

/// Parameters for fetching and compositing a radar image.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Web Mercator zoom level
    pub zoom: i32,
    /// Tiles to expand in each direction around the centre tile
    pub tile_radius: u32,
    /// Maximum concurrent tile downloads within one render
    pub tile_concurrency: usize,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// HTTP connect timeout
    pub connect_timeout: Duration,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Nowcast timestamp index endpoints
    pub timestamp_index_urls: Vec<String>,
    /// Basemap tiles, `{z}`/`{x}`/`{y}` placeholders
    pub basemap_url_template: String,
    /// Radar tiles, `{timestamp}` plus `{z}`/`{x}`/`{y}` placeholders
    pub radar_url_template: String,
    /// Lightning GeoJSON, `{timestamp}` placeholder
    pub lightning_url_template: String,
    /// Geocoder endpoint; query parameters are appended per request
    pub geocoder_url: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            zoom: 10,
            tile_radius: 2,
            tile_concurrency: 4,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("amesh-bot/{}", env!("CARGO_PKG_VERSION")),
            timestamp_index_urls: vec![
                "https://www.jma.go.jp/bosai/jmatile/data/nowc/targetTimes_N1.json".to_string(),
                "https://www.jma.go.jp/bosai/jmatile/data/nowc/targetTimes_N2.json".to_string(),
                "https://www.jma.go.jp/bosai/jmatile/data/nowc/targetTimes_N3.json".to_string(),
            ],
            basemap_url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            radar_url_template: "https://www.jma.go.jp/bosai/jmatile/data/nowc/{timestamp}/none/{timestamp}/surf/hrpns/{z}/{x}/{y}.png".to_string(),
            lightning_url_template: "https://www.jma.go.jp/bosai/jmatile/data/nowc/{timestamp}/none/{timestamp}/surf/liden/data.geojson".to_string(),
            geocoder_url: "https://map.yahooapis.jp/geocode/V1/geoCoder".to_string(),
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by `AMESH_ZOOM`, `AMESH_TILE_RADIUS` and
    /// `AMESH_TILE_CONCURRENCY` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(zoom) = env_parse("AMESH_ZOOM") {
            config.zoom = zoom;
        }
        if let Some(radius) = env_parse("AMESH_TILE_RADIUS") {
            config.tile_radius = radius;
        }
        if let Some(concurrency) = env_parse::<usize>("AMESH_TILE_CONCURRENCY") {
            config.tile_concurrency = concurrency.max(1);
        }
        config
    }

    /// Radar tile URL template with the timestamp substituted.
    pub fn radar_template_for(&self, timestamp: &str) -> String {
        self.radar_url_template
            .replace(TIMESTAMP_PLACEHOLDER, timestamp)
    }

    /// Lightning GeoJSON URL for a timestamp.
    pub fn lightning_url_for(&self, timestamp: &str) -> String {
        self.lightning_url_template
            .replace(TIMESTAMP_PLACEHOLDER, timestamp)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.zoom, 10);
        assert_eq!(config.tile_radius, 2);
        assert_eq!(config.timestamp_index_urls.len(), 3);
        assert!(config.user_agent.starts_with("amesh-bot/"));
    }

    #[test]
    fn test_radar_template_for() {
        let config = RenderConfig::default();
        assert_eq!(
            config.radar_template_for("20240101120000"),
            "https://www.jma.go.jp/bosai/jmatile/data/nowc/20240101120000/none/20240101120000/surf/hrpns/{z}/{x}/{y}.png"
        );
    }

    #[test]
    fn test_lightning_url_for() {
        let config = RenderConfig::default();
        assert_eq!(
            config.lightning_url_for("20240101115500"),
            "https://www.jma.go.jp/bosai/jmatile/data/nowc/20240101115500/none/20240101115500/surf/liden/data.geojson"
        );
    }

    #[test]
    fn test_empty_timestamp_still_builds_url() {
        let config = RenderConfig::default();
        assert!(config.radar_template_for("").contains("/nowc//none//surf/"));
    }
}
