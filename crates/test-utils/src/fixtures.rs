//! Common test fixtures for amesh tests.
//!
//! Canned upstream responses shaped like the JMA nowcast and Yahoo geocoder
//! payloads the render pipeline consumes.

/// Well-known places used across the suite.
pub mod places {
    /// Tokyo Metropolitan Government Building
    pub const TOKYO: (f64, f64) = (35.6895, 139.6917);

    /// Osaka Station
    pub const OSAKA: (f64, f64) = (34.7025, 135.4959);

    /// Null Island
    pub const ORIGIN: (f64, f64) = (0.0, 0.0);
}

/// Timestamp-index (`targetTimes_N*.json`) bodies.
pub mod timestamps {
    /// Reference time both layers are published at.
    pub const LATEST: &str = "20240101120000";

    /// One record carrying both radar and lightning layers.
    pub const SINGLE_RECORD: &str = r#"[
        {
            "basetime": "20240101120000",
            "validtime": "20240101120000",
            "elements": ["hrpns_nd", "liden"]
        }
    ]"#;

    /// Several records: an older analysis, the latest analysis and a
    /// forecast whose validtime differs from its basetime.
    pub const MIXED_RECORDS: &str = r#"[
        {
            "basetime": "20240101115500",
            "validtime": "20240101115500",
            "elements": ["hrpns_nd", "liden"]
        },
        {
            "basetime": "20240101120000",
            "validtime": "20240101120000",
            "elements": ["hrpns_nd"]
        },
        {
            "basetime": "20240101120000",
            "validtime": "20240101130000",
            "elements": ["hrpns_nd", "liden"]
        }
    ]"#;

    /// A second index that knows about a layer no other index publishes.
    pub const OTHER_INDEX: &str = r#"[
        {
            "basetime": "20240101114000",
            "validtime": "20240101114000",
            "elements": ["hrpns_nd", "amds_rain10m"]
        }
    ]"#;

    pub const EMPTY: &str = "[]";
}

/// Lightning GeoJSON bodies.
pub mod lightning {
    /// One strike just north-east of Tokyo.
    pub const SINGLE_STRIKE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [139.7, 35.7] },
                "properties": { "type": 1 }
            }
        ]
    }"#;

    /// Strikes with and without elevation, plus one with a truncated
    /// coordinate array that must be skipped.
    pub const MIXED_STRIKES: &str = r#"{
        "features": [
            {
                "geometry": { "coordinates": [139.7, 35.7, 12.5] },
                "properties": { "type": 2 }
            },
            {
                "geometry": { "coordinates": [135.5] },
                "properties": { "type": 1 }
            },
            {
                "geometry": { "coordinates": [135.4959, 34.7025] },
                "properties": { "type": 5 }
            }
        ]
    }"#;

    pub const EMPTY: &str = r#"{"features": []}"#;
}

/// Yahoo geocoder bodies.
pub mod geocoder {
    pub const TOKYO: &str = r#"{
        "ResultInfo": { "Count": 1 },
        "Feature": [
            {
                "Name": "東京都",
                "Geometry": { "Type": "point", "Coordinates": "139.69170639,35.68949742" }
            }
        ]
    }"#;

    pub const NO_RESULTS: &str = r#"{ "ResultInfo": { "Count": 0 }, "Feature": [] }"#;

    pub const MISSING_FEATURE: &str = r#"{ "ResultInfo": { "Count": 0 } }"#;

    pub const ONE_FIELD: &str = r#"{
        "Feature": [ { "Name": "壊れた", "Geometry": { "Coordinates": "139.69170639" } } ]
    }"#;

    pub const THREE_FIELDS: &str = r#"{
        "Feature": [ { "Name": "高さ付き", "Geometry": { "Coordinates": "139.6917,35.6894,40.0" } } ]
    }"#;

    pub const NON_NUMERIC: &str = r#"{
        "Feature": [ { "Name": "文字", "Geometry": { "Coordinates": "east,north" } } ]
    }"#;
}
