//! Export selected periods to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts, so station metadata is joined in here rather than left to the
//! consumer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{PeriodSet, Station};
use crate::error::AppError;

/// Write one row per selected period.
pub fn write_periods_csv(path: &Path, station: &Station, set: &PeriodSet) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::invalid_argument(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "station_id,station_name,rank,start_date,end_date,window_days,cumulative_mm,daily_mean_mm"
    )
    .map_err(|e| AppError::invalid_argument(format!("Failed to write export CSV header: {e}")))?;

    for (rank, period) in set.periods.iter().enumerate() {
        writeln!(
            file,
            "{},{},{},{},{},{},{:.1},{:.2}",
            station.id,
            station.name.as_deref().unwrap_or(""),
            rank + 1,
            period.start_date,
            period.end_date,
            set.window_length,
            period.cumulative_mm,
            set.daily_mean_mm(period),
        )
        .map_err(|e| AppError::invalid_argument(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
