//! Command-line parsing for the rainy-period analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the analysis code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::finder::DEFAULT_MAX_PERIODS;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "pluvio",
    version,
    about = "Top-N rainiest periods per weather station, from daily precipitation CSVs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze one station: find the wettest windows, report, plot, export.
    Analyze(AnalyzeArgs),
    /// Rank every station in the file by its single wettest window.
    Scan(ScanArgs),
    /// Re-render the chart from a previously exported periods JSON.
    Plot(PlotArgs),
    /// Run the full pipeline on a seeded synthetic series (no input files).
    Demo(DemoArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `pluvio analyze`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(AnalyzeArgs),
}

/// Common options for analyzing and the TUI.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Daily precipitation CSV (';'-separated). Falls back to $PLUVIO_CSV.
    #[arg(short = 'f', long)]
    pub csv: Option<PathBuf>,

    /// GeoJSON station sheet for display metadata. Falls back to $PLUVIO_STATIONS.
    #[arg(long)]
    pub stations: Option<PathBuf>,

    /// Station identifier (NUM_POSTE). Prompted for when omitted.
    #[arg(short = 's', long)]
    pub station: Option<String>,

    /// Window length in days. Prompted for when omitted.
    #[arg(short = 'w', long)]
    pub window: Option<usize>,

    /// Maximum number of periods to report.
    #[arg(long, default_value_t = DEFAULT_MAX_PERIODS)]
    pub max_periods: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export periods to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export periods + series to JSON (replayable with `pluvio plot`).
    #[arg(long = "export-periods")]
    pub export_periods: Option<PathBuf>,
}

/// Options for the per-station scan.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Daily precipitation CSV (';'-separated). Falls back to $PLUVIO_CSV.
    #[arg(short = 'f', long)]
    pub csv: Option<PathBuf>,

    /// GeoJSON station sheet for display metadata. Falls back to $PLUVIO_STATIONS.
    #[arg(long)]
    pub stations: Option<PathBuf>,

    /// Window length in days.
    #[arg(short = 'w', long, default_value_t = 5)]
    pub window: usize,

    /// Show only the top-N stations (0 = all).
    #[arg(long, default_value_t = 0)]
    pub top: usize,
}

/// Options for plotting a saved analysis.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Periods JSON file produced by `pluvio analyze --export-periods`.
    #[arg(long, value_name = "JSON")]
    pub periods: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for the synthetic-series demo.
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Random seed for series generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of generated days.
    #[arg(long, default_value_t = 730)]
    pub days: usize,

    /// Window length in days.
    #[arg(short = 'w', long, default_value_t = 5)]
    pub window: usize,

    /// Maximum number of periods to report.
    #[arg(long, default_value_t = DEFAULT_MAX_PERIODS)]
    pub max_periods: usize,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
