//! Read/write periods JSON files.
//!
//! Periods JSON is the "portable" representation of one analysis:
//! - the station (with whatever metadata was known at analysis time)
//! - the window length and the selected periods
//! - the raw daily series, so `pluvio plot` can re-render the chart later
//!
//! Quality flags are display-only and are not persisted.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DailyObservation, PeriodSet, RainyPeriod, Station, StationSeries};
use crate::error::AppError;

/// A saved analysis (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodsFile {
    pub tool: String,
    pub station: Station,
    pub window_length: usize,
    pub periods: Vec<RainyPeriod>,
    pub series: SeriesGrid,
}

/// Column-oriented series storage; `null` marks a missing measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesGrid {
    pub dates: Vec<NaiveDate>,
    pub rainfall_mm: Vec<Option<f64>>,
}

impl PeriodsFile {
    pub fn from_analysis(station: &Station, set: &PeriodSet, series: &StationSeries) -> Self {
        Self {
            tool: "pluvio".to_string(),
            station: station.clone(),
            window_length: set.window_length,
            periods: set.periods.clone(),
            series: SeriesGrid {
                dates: series.observations().iter().map(|o| o.date).collect(),
                rainfall_mm: series
                    .observations()
                    .iter()
                    .map(|o| o.rainfall_mm)
                    .collect(),
            },
        }
    }

    /// Rebuild the period set for reporting/plotting.
    pub fn to_period_set(&self) -> PeriodSet {
        PeriodSet {
            station_id: self.station.id.clone(),
            window_length: self.window_length,
            periods: self.periods.clone(),
        }
    }

    /// Rebuild the station series for plotting.
    pub fn to_series(&self) -> Result<StationSeries, AppError> {
        if self.series.dates.len() != self.series.rainfall_mm.len() {
            return Err(AppError::invalid_argument(
                "Periods JSON: `dates` and `rainfall_mm` lengths differ.",
            ));
        }
        let observations = self
            .series
            .dates
            .iter()
            .zip(&self.series.rainfall_mm)
            .map(|(&date, &rainfall_mm)| DailyObservation {
                date,
                rainfall_mm,
                quality: None,
            })
            .collect();
        StationSeries::new(self.station.id.clone(), observations)
    }
}

/// Write a periods JSON file.
pub fn write_periods_json(
    path: &Path,
    station: &Station,
    set: &PeriodSet,
    series: &StationSeries,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::invalid_argument(format!(
            "Failed to create periods JSON '{}': {e}",
            path.display()
        ))
    })?;

    let contents = PeriodsFile::from_analysis(station, set, series);
    serde_json::to_writer_pretty(file, &contents)
        .map_err(|e| AppError::invalid_argument(format!("Failed to write periods JSON: {e}")))?;

    Ok(())
}

/// Read a periods JSON file.
pub fn read_periods_json(path: &Path) -> Result<PeriodsFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_argument(format!(
            "Failed to open periods JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::invalid_argument(format!("Invalid periods JSON: {e}")))
}
