//! Daily climatology CSV ingest and normalization.
//!
//! This module turns a `;`-delimited daily precipitation export (one row per
//! station and day) into per-station `StationSeries` plus a station directory
//! assembled from the file's metadata columns.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (stations in sorted order, stable row errors)
//! - **Separation of concerns**: no period detection here
//!
//! Recognized columns (header names are case-insensitive, BOM tolerated):
//! `NUM_POSTE` and `AAAAMMJJ` (required), `RR` (required column; an empty
//! value is a missing measurement, not a zero), `QRR`, `NOM_USUEL`, `LAT`,
//! `LON`, `ALTI`. Any other column is ignored.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{DailyObservation, Station, StationDirectory, StationSeries};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub station: Option<String>,
    pub message: String,
}

/// Ingest output: per-station series + CSV-derived directory + accounting.
#[derive(Debug, Clone)]
pub struct RainfallDataset {
    series: BTreeMap<String, StationSeries>,
    pub stations: StationDirectory,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl RainfallDataset {
    pub fn station_count(&self) -> usize {
        self.series.len()
    }

    pub fn station_ids(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn series(&self, station_id: &str) -> Option<&StationSeries> {
        self.series.get(station_id)
    }

    pub fn all_series(&self) -> impl Iterator<Item = &StationSeries> {
        self.series.values()
    }
}

/// Load and normalize a daily precipitation CSV.
pub fn load_daily_rainfall(path: &Path) -> Result<RainfallDataset, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_argument(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    read_daily_rainfall(file)
}

/// Reader-based entry point (used directly by tests).
pub fn read_daily_rainfall<R: Read>(input: R) -> Result<RainfallDataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_argument(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in ["num_poste", "aaaammjj", "rr"] {
        if !header_map.contains_key(required) {
            return Err(AppError::invalid_argument(format!(
                "Missing required column: `{}`",
                required.to_uppercase()
            )));
        }
    }

    let mut raw: BTreeMap<String, Vec<DailyObservation>> = BTreeMap::new();
    let mut stations = StationDirectory::default();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    station: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok((station, observation)) => {
                raw.entry(station.id.clone()).or_default().push(observation);
                stations.upsert(station);
            }
            Err((station, message)) => row_errors.push(RowError {
                line,
                station,
                message,
            }),
        }
    }

    let mut series = BTreeMap::new();
    let mut rows_used = 0usize;

    for (station_id, mut observations) in raw {
        // The export is usually date-ordered already, but nothing downstream
        // may rely on that.
        observations.sort_by_key(|o| o.date);

        let mut kept: Vec<DailyObservation> = Vec::with_capacity(observations.len());
        for observation in observations {
            if kept.last().is_some_and(|last| last.date == observation.date) {
                row_errors.push(RowError {
                    line: 0,
                    station: Some(station_id.clone()),
                    message: format!("Duplicate date {} (later row dropped).", observation.date),
                });
                continue;
            }
            kept.push(observation);
        }

        rows_used += kept.len();
        series.insert(station_id.clone(), StationSeries::new(station_id, kept)?);
    }

    if rows_used == 0 {
        return Err(AppError::no_data(
            "No valid observations remain after validation.",
        ));
    }

    Ok(RainfallDataset {
        series,
        stations,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Some Météo-France exports carry a UTF-8 BOM on the first header; if we
    // don't strip it, schema validation incorrectly reports a missing column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

type RowFailure = (Option<String>, String);

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<(Station, DailyObservation), RowFailure> {
    let station_id = get_optional(record, header_map, "num_poste")
        .map(str::to_string)
        .ok_or((None, "Missing `NUM_POSTE` value.".to_string()))?;

    let date_field = get_optional(record, header_map, "aaaammjj")
        .ok_or((Some(station_id.clone()), "Missing `AAAAMMJJ` value.".to_string()))?;
    let date = parse_date_yyyymmdd(date_field)
        .map_err(|message| (Some(station_id.clone()), message))?;

    let rainfall_mm = match get_optional(record, header_map, "rr") {
        None => None, // recorded day with a missing measurement
        Some(raw) => {
            let value = parse_amount(raw).map_err(|message| (Some(station_id.clone()), message))?;
            Some(value)
        }
    };

    let quality = get_optional(record, header_map, "qrr").map(str::to_string);

    let station = Station {
        name: get_optional(record, header_map, "nom_usuel").map(str::to_string),
        commune: None,
        altitude_m: parse_opt_f64(get_optional(record, header_map, "alti")),
        latitude: parse_opt_f64(get_optional(record, header_map, "lat")),
        longitude: parse_opt_f64(get_optional(record, header_map, "lon")),
        ..Station::with_id(station_id)
    };

    Ok((
        station,
        DailyObservation {
            date,
            rainfall_mm,
            quality,
        },
    ))
}

fn parse_date_yyyymmdd(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|_| format!("Invalid date '{s}'. Expected AAAAMMJJ (e.g. 19991226)."))
}

fn parse_amount(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("Invalid rainfall value '{s}'."))?;
    if !value.is_finite() {
        return Err(format!("Non-finite rainfall value '{s}'."));
    }
    if value < 0.0 {
        return Err(format!("Negative rainfall value '{s}'."));
    }
    Ok(value)
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
NUM_POSTE;NOM_USUEL;LAT;LON;ALTI;AAAAMMJJ;RR;QRR
01014002;ARBENT;46.278167;5.669;534;20230101;4.2;1
01014002;ARBENT;46.278167;5.669;534;20230102;;1
01014002;ARBENT;46.278167;5.669;534;20230103;12.8;1
01089001;CEYZERIAT;46.18;5.305;251;20230101;0.0;1
";

    #[test]
    fn loads_two_stations() {
        let dataset = read_daily_rainfall(SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.station_count(), 2);
        assert_eq!(dataset.rows_read, 4);
        assert_eq!(dataset.rows_used, 4);
        assert!(dataset.row_errors.is_empty());

        let arbent = dataset.series("01014002").unwrap();
        assert_eq!(arbent.len(), 3);
        assert_eq!(arbent.observations()[0].rainfall_mm, Some(4.2));
        assert_eq!(arbent.observations()[1].rainfall_mm, None);
        assert_eq!(arbent.missing_count(), 1);

        let station = dataset.stations.find("01014002").unwrap();
        assert_eq!(station.name.as_deref(), Some("ARBENT"));
        assert_eq!(station.altitude_m, Some(534.0));
    }

    #[test]
    fn header_names_are_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}num_poste;aaaammjj;rr\n123;20230101;1.5\n";
        let dataset = read_daily_rainfall(csv.as_bytes()).unwrap();
        assert_eq!(dataset.station_count(), 1);
        assert!(dataset.series("123").is_some());
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let csv = "NUM_POSTE;AAAAMMJJ\n123;20230101\n";
        let err = read_daily_rainfall(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("RR"));
    }

    #[test]
    fn bad_rows_are_collected_not_fatal() {
        let csv = "\
NUM_POSTE;AAAAMMJJ;RR
123;20230101;1.0
123;2023-01-02;2.0
123;20230103;-4.0
123;20230104;3.0
";
        let dataset = read_daily_rainfall(csv.as_bytes()).unwrap();
        assert_eq!(dataset.rows_read, 4);
        assert_eq!(dataset.rows_used, 2);
        assert_eq!(dataset.row_errors.len(), 2);
        assert_eq!(dataset.row_errors[0].line, 3);
        assert!(dataset.row_errors[0].message.contains("Invalid date"));
        assert!(dataset.row_errors[1].message.contains("Negative"));
    }

    #[test]
    fn duplicate_dates_keep_first_row() {
        let csv = "\
NUM_POSTE;AAAAMMJJ;RR
123;20230101;1.0
123;20230101;9.0
";
        let dataset = read_daily_rainfall(csv.as_bytes()).unwrap();
        let series = dataset.series("123").unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.observations()[0].rainfall_mm, Some(1.0));
        assert_eq!(dataset.row_errors.len(), 1);
        assert!(dataset.row_errors[0].message.contains("Duplicate date"));
    }

    #[test]
    fn rows_are_sorted_per_station() {
        let csv = "\
NUM_POSTE;AAAAMMJJ;RR
123;20230103;3.0
123;20230101;1.0
123;20230102;2.0
";
        let dataset = read_daily_rainfall(csv.as_bytes()).unwrap();
        let dates: Vec<_> = dataset
            .series("123")
            .unwrap()
            .observations()
            .iter()
            .map(|o| o.date.to_string())
            .collect();
        assert_eq!(dates, ["2023-01-01", "2023-01-02", "2023-01-03"]);
    }

    #[test]
    fn no_usable_rows_is_no_data_error() {
        let csv = "NUM_POSTE;AAAAMMJJ;RR\n123;garbage;1.0\n";
        let err = read_daily_rainfall(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
