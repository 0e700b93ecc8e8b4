//! GeoJSON station directory.
//!
//! The station sheet file is a GeoJSON `FeatureCollection`; each feature
//! carries the station identifier, display name, commune, and altitude in its
//! `properties` and the `[longitude, latitude]` pair in its `geometry`.
//!
//! Field types in these files are not reliable (`NUM_POSTE` shows up both as
//! a number and as a string, depending on the export), so individual fields
//! are coerced and a malformed feature is skipped rather than failing the
//! whole file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Station, StationDirectory};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

/// Directory plus the number of features that could not be used.
#[derive(Debug)]
pub struct DirectoryLoad {
    pub directory: StationDirectory,
    pub skipped: usize,
}

/// Load a GeoJSON station sheet.
pub fn load_station_directory(path: &Path) -> Result<DirectoryLoad, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_argument(format!(
            "Failed to open station file '{}': {e}",
            path.display()
        ))
    })?;
    read_station_directory(file)
}

/// Reader-based entry point (used directly by tests).
pub fn read_station_directory<R: Read>(input: R) -> Result<DirectoryLoad, AppError> {
    let collection: FeatureCollection = serde_json::from_reader(input)
        .map_err(|e| AppError::invalid_argument(format!("Invalid station GeoJSON: {e}")))?;

    let mut directory = StationDirectory::default();
    let mut skipped = 0usize;

    for feature in collection.features {
        match station_from_feature(&feature) {
            Some(station) => directory.upsert(station),
            None => skipped += 1,
        }
    }

    Ok(DirectoryLoad { directory, skipped })
}

fn station_from_feature(feature: &Feature) -> Option<Station> {
    let id = value_to_string(feature.properties.get("NUM_POSTE")?)?;

    let (longitude, latitude) = match &feature.geometry {
        Some(g) if g.coordinates.len() >= 2 => (Some(g.coordinates[0]), Some(g.coordinates[1])),
        _ => (None, None),
    };

    Some(Station {
        name: feature
            .properties
            .get("NOM_USUEL")
            .and_then(value_to_string),
        commune: feature.properties.get("COMMUNE").and_then(value_to_string),
        altitude_m: feature.properties.get("ALTI").and_then(value_to_f64),
        latitude,
        longitude,
        ..Station::with_id(id)
    })
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "COMMUNE": "Arbent",
                    "NUM_POSTE": "01014002",
                    "ALTI": 534,
                    "NOM_USUEL": "ARBENT"
                },
                "geometry": { "type": "Point", "coordinates": [5.669, 46.278167] }
            },
            {
                "type": "Feature",
                "properties": {
                    "COMMUNE": "Ceyzériat",
                    "NUM_POSTE": 1089001,
                    "ALTI": "251",
                    "NOM_USUEL": "CEYZERIAT"
                },
                "geometry": { "type": "Point", "coordinates": [5.305, 46.18] }
            },
            {
                "type": "Feature",
                "properties": { "NOM_USUEL": "NO ID" }
            }
        ]
    }"#;

    #[test]
    fn loads_features_and_skips_malformed() {
        let load = read_station_directory(SAMPLE.as_bytes()).unwrap();
        assert_eq!(load.directory.len(), 2);
        assert_eq!(load.skipped, 1);

        let arbent = load.directory.find("01014002").unwrap();
        assert_eq!(arbent.name.as_deref(), Some("ARBENT"));
        assert_eq!(arbent.commune.as_deref(), Some("Arbent"));
        assert_eq!(arbent.altitude_m, Some(534.0));
        assert_eq!(arbent.longitude, Some(5.669));
        assert_eq!(arbent.latitude, Some(46.278167));
    }

    #[test]
    fn numeric_ids_and_string_altitudes_are_coerced() {
        let load = read_station_directory(SAMPLE.as_bytes()).unwrap();
        let ceyzeriat = load.directory.find("1089001").unwrap();
        assert_eq!(ceyzeriat.altitude_m, Some(251.0));
    }

    #[test]
    fn invalid_json_is_schema_error() {
        let err = read_station_directory("not json".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn merge_enriches_csv_directory() {
        let mut from_csv = StationDirectory::default();
        from_csv.upsert(Station {
            name: Some("ARBENT".to_string()),
            ..Station::with_id("01014002")
        });

        let load = read_station_directory(SAMPLE.as_bytes()).unwrap();
        from_csv.merge(load.directory);

        let merged = from_csv.find("01014002").unwrap();
        assert_eq!(merged.name.as_deref(), Some("ARBENT"));
        assert_eq!(merged.commune.as_deref(), Some("Arbent"));
        assert_eq!(merged.altitude_m, Some(534.0));
    }
}
