//! Geographic values passed between the resolver, the compositor and the bot.

use serde::{Deserialize, Serialize};

/// A resolved place.
///
/// Latitude is expected in [-90, 90] and longitude in [-180, 180]; values
/// outside produce meaningless projections rather than errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, display_name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            display_name: display_name.into(),
        }
    }

    /// Location for directly entered coordinates, named "lat,lng" to 2 decimals.
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            display_name: format!("{:.2},{:.2}", latitude, longitude),
        }
    }
}

/// A single lightning strike from the lightning GeoJSON feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightningPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Strike classification from `properties.type`.
    pub kind: i64,
}
