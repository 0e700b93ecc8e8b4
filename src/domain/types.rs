//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the rainy-period finder
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One recorded day of precipitation for one station.
///
/// `rainfall_mm = None` models a recorded-but-missing measurement (an empty
/// `RR` cell in the source file). The quality flag is opaque: it is carried
/// for display and export, never interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub rainfall_mm: Option<f64>,
    pub quality: Option<String>,
}

/// An ordered daily series for one station.
///
/// Invariant: observations are strictly increasing by date (no duplicates).
/// Calendar gaps are permitted and mean *absent data*, not zero rainfall:
/// the finder's window is positional over the rows actually present.
///
/// The invariant is enforced at construction; downstream code (the finder in
/// particular) relies on it and never re-sorts.
#[derive(Debug, Clone)]
pub struct StationSeries {
    station_id: String,
    observations: Vec<DailyObservation>,
}

impl StationSeries {
    /// Build a series, validating the date invariant.
    pub fn new(
        station_id: impl Into<String>,
        observations: Vec<DailyObservation>,
    ) -> Result<Self, AppError> {
        let station_id = station_id.into();
        for pair in observations.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AppError::invalid_argument(format!(
                    "Station {station_id}: observations not strictly ascending by date \
                     ({} then {}).",
                    pair[0].date, pair[1].date
                )));
            }
        }
        Ok(Self {
            station_id,
            observations,
        })
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn observations(&self) -> &[DailyObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Largest recorded daily amount (missing values ignored).
    pub fn max_daily_mm(&self) -> Option<f64> {
        self.observations
            .iter()
            .filter_map(|o| o.rainfall_mm)
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }

    /// Number of observations with a missing rainfall value.
    pub fn missing_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| o.rainfall_mm.is_none())
            .count()
    }
}

/// One selected rainfall period.
///
/// `start_date` is derived as `end_date - (window_length - 1)` calendar days;
/// when the underlying window spans a calendar gap, the derived range can
/// include dates with no observation (see the finder's module docs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainyPeriod {
    pub station_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cumulative_mm: f64,
}

impl RainyPeriod {
    /// Calendar length of the derived date range, in days.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// The ordered result of one finder invocation: up to `max_periods` periods,
/// descending by cumulative rainfall by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSet {
    pub station_id: String,
    pub window_length: usize,
    pub periods: Vec<RainyPeriod>,
}

impl PeriodSet {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Average daily rainfall over a period of this set's window length.
    pub fn daily_mean_mm(&self, period: &RainyPeriod) -> f64 {
        period.cumulative_mm / self.window_length as f64
    }
}

/// Station display metadata.
///
/// Assembled from the climatology CSV's metadata columns and/or a GeoJSON
/// feature collection; everything beyond the identifier is optional because
/// both sources are incomplete in practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: Option<String>,
    pub commune: Option<String>,
    pub altitude_m: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Station {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            commune: None,
            altitude_m: None,
            latitude: None,
            longitude: None,
        }
    }

    /// `NAME (id)` when a name is known, bare id otherwise.
    pub fn display_label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} (n°{})", self.id),
            None => format!("n°{}", self.id),
        }
    }
}

/// Ordered station collection with id lookup.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    stations: Vec<Station>,
}

impl StationDirectory {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// Insert a station, or fill in missing fields of an existing entry.
    ///
    /// Existing values win: the first source to provide a field keeps it.
    pub fn upsert(&mut self, station: Station) {
        match self.stations.iter_mut().find(|s| s.id == station.id) {
            Some(existing) => {
                if existing.name.is_none() {
                    existing.name = station.name;
                }
                if existing.commune.is_none() {
                    existing.commune = station.commune;
                }
                if existing.altitude_m.is_none() {
                    existing.altitude_m = station.altitude_m;
                }
                if existing.latitude.is_none() {
                    existing.latitude = station.latitude;
                }
                if existing.longitude.is_none() {
                    existing.longitude = station.longitude;
                }
            }
            None => self.stations.push(station),
        }
    }

    /// Overlay another directory onto this one (other fills gaps only).
    pub fn merge(&mut self, other: StationDirectory) {
        for station in other.stations {
            self.upsert(station);
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus `PLUVIO_CSV` / `PLUVIO_STATIONS`
/// environment fallbacks.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: Option<PathBuf>,
    pub stations_path: Option<PathBuf>,
    /// Station to analyze; `None` triggers the interactive picker.
    pub station_id: Option<String>,
    /// Window length in days; `None` triggers the interactive prompt.
    pub window_length: Option<usize>,
    pub max_periods: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_periods: Option<PathBuf>,
}
