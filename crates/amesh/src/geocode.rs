//! Place resolution: raw coordinates or a geocoder lookup.

use amesh_common::{AmeshError, AmeshResult, Location, ResultExt};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::{RenderConfig, DEFAULT_PLACE};
use crate::fetcher::{FetchRequest, HttpFetcher};

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(rename = "Feature", default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Geometry")]
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    #[serde(rename = "Coordinates")]
    coordinates: String,
}

/// Parse `"lat lng"` typed directly by a user.
///
/// Exactly two whitespace-separated tokens that both parse as floats;
/// anything else is `None` and should be geocoded instead.
pub fn parse_coordinates(raw: &str) -> Option<Location> {
    let mut tokens = raw.split_whitespace();
    let (lat, lng) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(lat), Some(lng), None) => (lat, lng),
        _ => return None,
    };
    let lat: f64 = lat.parse().ok()?;
    let lng: f64 = lng.parse().ok()?;
    Some(Location::from_coordinates(lat, lng))
}

/// Parse a geocoder `"lng,lat"` coordinate string.
pub fn parse_geocoder_coordinates(raw: &str) -> AmeshResult<(f64, f64)> {
    let fields: Vec<&str> = raw.split(',').collect();
    let [lng, lat] = fields.as_slice() else {
        return Err(AmeshError::InvalidCoordinateFormat(format!(
            "expected \"lng,lat\", got {:?}",
            raw
        )));
    };
    let parse = |field: &str| {
        field.parse::<f64>().map_err(|e| {
            AmeshError::InvalidCoordinateFormat(format!("{:?} is not a number: {}", field, e))
        })
    };
    Ok((parse(*lat)?, parse(*lng)?))
}

/// Look a place name up with the geocoder.
///
/// Non-2xx answers and transport failures are `Geocoding` errors; an empty
/// result set is `NotFound`.
#[instrument(skip(fetcher, config, api_key))]
pub async fn geocode(
    fetcher: &dyn HttpFetcher,
    config: &RenderConfig,
    place: &str,
    api_key: &str,
) -> AmeshResult<Location> {
    let request = FetchRequest::get(&config.geocoder_url)
        .with_query("appid", api_key)
        .with_query("query", place)
        .with_query("output", "json");

    let response = fetcher
        .fetch(&request)
        .await
        .map_err(|e| AmeshError::Geocoding(e.to_string()))?;
    if !response.is_success() {
        return Err(AmeshError::Geocoding(format!(
            "geocoder answered {}",
            response.status
        )));
    }

    // An undecodable answer aborts the lookup like any other geocoder failure
    let parsed: GeocodeResponse = serde_json::from_slice(&response.body)
        .map_err(|e| AmeshError::Geocoding(format!("malformed geocoder response: {}", e)))?;

    let feature = parsed
        .features
        .into_iter()
        .next()
        .ok_or_else(|| AmeshError::NotFound(place.to_string()))?;

    let (lat, lng) = parse_geocoder_coordinates(&feature.geometry.coordinates)
        .with_context(|| format!("geocoder result for {}", place))?;

    debug!(name = %feature.name, lat = lat, lng = lng, "Geocoded place");
    Ok(Location::new(lat, lng, feature.name))
}

/// Resolve user input to a location.
///
/// Two numeric tokens are taken as `lat lng` without any network call;
/// everything else goes to the geocoder, with an empty place meaning the
/// default place.
#[instrument(skip(fetcher, config, api_key))]
pub async fn resolve_location(
    fetcher: &dyn HttpFetcher,
    config: &RenderConfig,
    raw_place: &str,
    api_key: &str,
) -> AmeshResult<Location> {
    if let Some(location) = parse_coordinates(raw_place) {
        debug!(name = %location.display_name, "Using literal coordinates");
        return Ok(location);
    }

    let place = match raw_place.trim() {
        "" => DEFAULT_PLACE,
        trimmed => trimmed,
    };
    let location = geocode(fetcher, config, place, api_key)
        .await
        .with_context(|| format!("resolving {}", place))?;

    info!(
        place = place,
        name = %location.display_name,
        "Resolved location"
    );
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amesh_common::ErrorKind;

    #[test]
    fn test_parse_coordinates() {
        let loc = parse_coordinates("35.6895 139.6917").unwrap();
        assert_eq!(loc.latitude, 35.6895);
        assert_eq!(loc.longitude, 139.6917);
        assert_eq!(loc.display_name, "35.69,139.69");
    }

    #[test]
    fn test_parse_coordinates_extra_whitespace() {
        assert!(parse_coordinates("  35.0 \t 135.0 ").is_some());
    }

    #[test]
    fn test_parse_coordinates_rejects_other_shapes() {
        assert!(parse_coordinates("35.0").is_none());
        assert!(parse_coordinates("35.0 135.0 10").is_none());
        assert!(parse_coordinates("東京 駅").is_none());
        assert!(parse_coordinates("35.0 east").is_none());
        assert!(parse_coordinates("").is_none());
    }

    #[test]
    fn test_geocoder_coordinates_order() {
        let (lat, lng) = parse_geocoder_coordinates("139.69170639,35.68949742").unwrap();
        assert_eq!(lat, 35.68949742);
        assert_eq!(lng, 139.69170639);
    }

    #[test]
    fn test_geocoder_coordinates_field_count() {
        for raw in ["139.69", "139.69,35.68,40.0", ""] {
            let err = parse_geocoder_coordinates(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidCoordinateFormat, "{}", raw);
        }
    }

    #[test]
    fn test_geocoder_coordinates_non_numeric() {
        let err = parse_geocoder_coordinates("east,north").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCoordinateFormat);
    }

    #[test]
    fn test_geocoder_coordinates_reject_padding() {
        for raw in [" 139.7,35.6", "139.7, 35.6", "139.7,35.6\n"] {
            let err = parse_geocoder_coordinates(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidCoordinateFormat, "{:?}", raw);
        }
    }
}
