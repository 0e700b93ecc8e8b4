//! Shared analysis pipeline used by the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load CSV -> merge station directory -> find periods -> report data
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Every query is a stateless call: any driver (prompt loop, batch job,
//! service endpoint) can run analyses by calling `run_analysis` per query.

use rayon::prelude::*;

use crate::domain::{PeriodSet, RunConfig, Station, StationDirectory, StationSeries};
use crate::error::AppError;
use crate::finder::find_rainy_periods;
use crate::io::ingest::{RainfallDataset, load_daily_rainfall};
use crate::io::stations::load_station_directory;
use crate::report::StationBest;

/// Everything a front-end needs after the input files are read.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub dataset: RainfallDataset,
    /// CSV-derived directory enriched with the GeoJSON sheet (when given).
    pub directory: StationDirectory,
    /// GeoJSON features that could not be used (0 without a sheet).
    pub geo_skipped: usize,
}

impl LoadedData {
    pub fn new(dataset: RainfallDataset, geo: Option<StationDirectory>, geo_skipped: usize) -> Self {
        let mut directory = dataset.stations.clone();
        if let Some(geo) = geo {
            directory.merge(geo);
        }
        Self {
            dataset,
            directory,
            geo_skipped,
        }
    }

    /// Directory restricted to stations that actually have observations,
    /// in dataset (id-sorted) order. This is what pickers should list:
    /// the GeoJSON sheet routinely mentions stations absent from the CSV.
    pub fn observed_stations(&self) -> StationDirectory {
        let mut out = StationDirectory::default();
        for id in self.dataset.station_ids() {
            let station = self
                .directory
                .find(id)
                .cloned()
                .unwrap_or_else(|| Station::with_id(id));
            out.upsert(station);
        }
        out
    }
}

/// Read the configured input files.
pub fn load_inputs(config: &RunConfig) -> Result<LoadedData, AppError> {
    let csv_path = config.csv_path.as_ref().ok_or_else(|| {
        AppError::invalid_argument("No CSV path given. Pass -f/--csv or set PLUVIO_CSV.")
    })?;

    let dataset = load_daily_rainfall(csv_path)?;

    let (geo, geo_skipped) = match &config.stations_path {
        Some(path) => {
            let load = load_station_directory(path)?;
            (Some(load.directory), load.skipped)
        }
        None => (None, 0),
    };

    Ok(LoadedData::new(dataset, geo, geo_skipped))
}

/// All computed outputs of a single station analysis.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub station: Station,
    pub series: StationSeries,
    pub periods: PeriodSet,
}

/// Analyze one station. Unknown ids are a caller error (exit code 3); the
/// finder itself never validates identifiers.
pub fn run_analysis(
    loaded: &LoadedData,
    station_id: &str,
    window_length: usize,
    max_periods: usize,
) -> Result<AnalysisOutput, AppError> {
    let series = loaded.dataset.series(station_id).ok_or_else(|| {
        AppError::no_data(format!("Station '{station_id}' is not in the dataset."))
    })?;

    let periods = find_rainy_periods(series, window_length, max_periods)?;

    let station = loaded
        .directory
        .find(station_id)
        .cloned()
        .unwrap_or_else(|| Station::with_id(station_id));

    Ok(AnalysisOutput {
        station,
        series: series.clone(),
        periods,
    })
}

/// Compute every station's single wettest window.
///
/// Queries are independent (the finder owns a private working copy per call),
/// so stations are processed in parallel. Stations with no positive window
/// come back with `best: None` — dry is an answer, not an error.
pub fn run_scan(loaded: &LoadedData, window_length: usize) -> Result<Vec<StationBest>, AppError> {
    let series: Vec<&StationSeries> = loaded.dataset.all_series().collect();

    series
        .par_iter()
        .map(|series| {
            let set = find_rainy_periods(series, window_length, 1)?;
            Ok(StationBest {
                station_id: series.station_id().to_string(),
                name: loaded
                    .directory
                    .find(series.station_id())
                    .and_then(|s| s.name.clone()),
                best: set.periods.into_iter().next(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_daily_rainfall;
    use crate::report::rank_scan;

    const CSV: &str = "\
NUM_POSTE;NOM_USUEL;AAAAMMJJ;RR
A1;ALPHA;20230101;1.0
A1;ALPHA;20230102;9.0
A1;ALPHA;20230103;9.0
B2;BRAVO;20230101;2.0
B2;BRAVO;20230102;2.0
C3;CHARLIE;20230101;0.0
C3;CHARLIE;20230102;0.0
";

    fn loaded() -> LoadedData {
        let dataset = read_daily_rainfall(CSV.as_bytes()).unwrap();
        LoadedData::new(dataset, None, 0)
    }

    #[test]
    fn analysis_joins_metadata_and_finds_periods() {
        let out = run_analysis(&loaded(), "A1", 2, 5).unwrap();
        assert_eq!(out.station.name.as_deref(), Some("ALPHA"));
        assert_eq!(out.periods.len(), 2);
        assert_eq!(out.periods.periods[0].cumulative_mm, 18.0);
    }

    #[test]
    fn unknown_station_is_no_data_error() {
        let err = run_analysis(&loaded(), "Z9", 2, 5).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn scan_ranks_stations_and_reports_dry_ones() {
        let results = run_scan(&loaded(), 2).unwrap();
        let ranked = rank_scan(results);

        let ids: Vec<_> = ranked.iter().map(|r| r.station_id.as_str()).collect();
        assert_eq!(ids, ["A1", "B2", "C3"]);
        assert_eq!(ranked[0].best.as_ref().unwrap().cumulative_mm, 18.0);
        assert!(ranked[2].best.is_none());
    }

    #[test]
    fn scan_propagates_invalid_window() {
        let err = run_scan(&loaded(), 0).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn observed_stations_lists_only_stations_with_data() {
        let mut geo = StationDirectory::default();
        geo.upsert(Station {
            commune: Some("Nowhere".to_string()),
            ..Station::with_id("Z9")
        });
        let dataset = read_daily_rainfall(CSV.as_bytes()).unwrap();
        let loaded = LoadedData::new(dataset, Some(geo), 0);

        let observed = loaded.observed_stations();
        assert_eq!(observed.len(), 3);
        assert!(observed.find("Z9").is_none());
    }
}
