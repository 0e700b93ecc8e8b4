//! Debug bundle writer for inspecting an analysis offline.
//!
//! Produces a timestamped markdown file under `debug/` with the station,
//! the selected periods, and the tail of the series — enough to reproduce
//! a surprising selection without shipping the full CSV.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::app::pipeline::AnalysisOutput;
use crate::error::AppError;

/// How many trailing observations the bundle includes.
const TAIL_ROWS: usize = 30;

pub fn write_debug_bundle(output: &AnalysisOutput) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir)
        .map_err(|e| AppError::internal(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!(
        "pluvio_debug_{}_w{}_{ts}.md",
        output.station.id, output.periods.window_length
    ));

    let mut file = File::create(&path)
        .map_err(|e| AppError::internal(format!("Failed to create debug file: {e}")))?;
    let werr = |e: std::io::Error| AppError::internal(format!("Failed to write debug file: {e}"));

    writeln!(file, "# pluvio debug bundle").map_err(werr)?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339()).map_err(werr)?;
    writeln!(file, "- station: {}", output.station.display_label()).map_err(werr)?;
    writeln!(file, "- window_length: {}", output.periods.window_length).map_err(werr)?;
    writeln!(
        file,
        "- series: n={} missing={} span={}..{}",
        output.series.len(),
        output.series.missing_count(),
        output
            .series
            .first_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
        output
            .series
            .last_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
    )
    .map_err(werr)?;

    writeln!(file, "\n## Selected periods").map_err(werr)?;
    writeln!(file, "| rank | start | end | cumulative_mm | daily_mean_mm |").map_err(werr)?;
    writeln!(file, "| - | - | - | - | - |").map_err(werr)?;
    for (idx, period) in output.periods.periods.iter().enumerate() {
        writeln!(
            file,
            "| {} | {} | {} | {:.1} | {:.2} |",
            idx + 1,
            period.start_date,
            period.end_date,
            period.cumulative_mm,
            output.periods.daily_mean_mm(period)
        )
        .map_err(werr)?;
    }
    if output.periods.is_empty() {
        writeln!(file, "(none)").map_err(werr)?;
    }

    writeln!(file, "\n## Series tail").map_err(werr)?;
    writeln!(file, "| date | rr_mm | quality |").map_err(werr)?;
    writeln!(file, "| - | - | - |").map_err(werr)?;
    let observations = output.series.observations();
    let tail_start = observations.len().saturating_sub(TAIL_ROWS);
    for observation in &observations[tail_start..] {
        writeln!(
            file,
            "| {} | {} | {} |",
            observation.date,
            observation
                .rainfall_mm
                .map(|v| format!("{v:.1}"))
                .unwrap_or_else(|| "-".to_string()),
            observation.quality.as_deref().unwrap_or("-"),
        )
        .map_err(werr)?;
    }

    Ok(path)
}
