//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (with env fallbacks for file paths)
//! - loads the precipitation CSV and the optional station sheet
//! - prompts for missing parameters
//! - runs the finder and prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{AnalyzeArgs, Command, DemoArgs, PlotArgs, ScanArgs, picker};
use crate::data::sample::{SampleConfig, demo_station, generate_sample_series};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::finder::find_rainy_periods;

pub mod pipeline;

/// Entry point for the `pluvio` binary.
pub fn run() -> Result<(), AppError> {
    // We want a bare `pluvio` (or `pluvio -f data.csv`) to behave like
    // `pluvio analyze ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the ask-two-questions UX of the original workflow.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Scan(args) => handle_scan(args),
        Command::Plot(args) => handle_plot(args),
        Command::Demo(args) => handle_demo(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let loaded = pipeline::load_inputs(&config)?;
    print_load_summary(&loaded);

    // Prompt only for what the flags left open; with both given, run once.
    let interactive = config.station_id.is_none() || config.window_length.is_none();
    let observed = loaded.observed_stations();

    loop {
        let station_id = match &config.station_id {
            Some(id) => id.clone(),
            None => picker::prompt_for_station(&observed)?,
        };
        let window_length = match config.window_length {
            Some(days) => days,
            None => picker::prompt_for_window_length()?,
        };

        let output = pipeline::run_analysis(&loaded, &station_id, window_length, config.max_periods)?;

        println!();
        print!(
            "{}",
            crate::report::format_run_summary(&output.station, &output.series)
        );
        println!();
        print!("{}", crate::report::format_periods(&output.periods));

        if config.plot && !output.periods.is_empty() {
            let plot = crate::plot::render_rainfall_plot(
                &output.series,
                &output.periods,
                config.plot_width,
                config.plot_height,
            );
            println!("\n{plot}");
        }

        if let Some(path) = &config.export_csv {
            crate::io::export::write_periods_csv(path, &output.station, &output.periods)?;
            println!("Wrote {}", path.display());
        }
        if let Some(path) = &config.export_periods {
            crate::io::periods::write_periods_json(
                path,
                &output.station,
                &output.periods,
                &output.series,
            )?;
            println!("Wrote {}", path.display());
        }

        if !interactive || !picker::prompt_yes_no("\nRun another analysis?")? {
            return Ok(());
        }
    }
}

fn handle_scan(args: ScanArgs) -> Result<(), AppError> {
    let config = scan_config_from_args(&args);
    let loaded = pipeline::load_inputs(&config)?;
    print_load_summary(&loaded);

    let results = pipeline::run_scan(&loaded, args.window)?;
    let mut ranked = crate::report::rank_scan(results);
    if args.top > 0 {
        ranked.truncate(args.top);
    }

    println!();
    print!("{}", crate::report::format_scan_table(&ranked, args.window));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::periods::read_periods_json(&args.periods)?;
    let series = file.to_series()?;
    let set = file.to_period_set();

    print!("{}", crate::report::format_run_summary(&file.station, &series));
    println!();
    print!("{}", crate::report::format_periods(&set));

    let plot = crate::plot::render_rainfall_plot(&series, &set, args.width, args.height);
    println!("\n{plot}");
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let series = generate_sample_series(&SampleConfig {
        seed: args.seed,
        days: args.days,
        ..SampleConfig::default()
    })?;
    let station = demo_station();
    let periods = find_rainy_periods(&series, args.window, args.max_periods)?;

    print!("{}", crate::report::format_run_summary(&station, &series));
    println!();
    print!("{}", crate::report::format_periods(&periods));

    if !periods.is_empty() {
        let plot = crate::plot::render_rainfall_plot(&series, &periods, args.width, args.height);
        println!("\n{plot}");
    }
    Ok(())
}

fn handle_tui(args: AnalyzeArgs) -> Result<(), AppError> {
    crate::tui::run(run_config_from_args(&args))
}

fn print_load_summary(loaded: &pipeline::LoadedData) {
    println!(
        "Loaded {} observations for {} station(s).",
        loaded.dataset.rows_used,
        loaded.dataset.station_count()
    );
    if !loaded.dataset.row_errors.is_empty() {
        println!("Skipped {} bad row(s).", loaded.dataset.row_errors.len());
    }
    if loaded.geo_skipped > 0 {
        println!("Ignored {} unusable station feature(s).", loaded.geo_skipped);
    }
}

pub fn run_config_from_args(args: &AnalyzeArgs) -> RunConfig {
    // `.env` support mirrors how deployment scripts pass the data paths.
    dotenvy::dotenv().ok();

    RunConfig {
        csv_path: args.csv.clone().or_else(|| env_path("PLUVIO_CSV")),
        stations_path: args.stations.clone().or_else(|| env_path("PLUVIO_STATIONS")),
        station_id: args.station.clone(),
        window_length: args.window,
        max_periods: args.max_periods,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_periods: args.export_periods.clone(),
    }
}

fn scan_config_from_args(args: &ScanArgs) -> RunConfig {
    dotenvy::dotenv().ok();

    RunConfig {
        csv_path: args.csv.clone().or_else(|| env_path("PLUVIO_CSV")),
        stations_path: args.stations.clone().or_else(|| env_path("PLUVIO_STATIONS")),
        station_id: None,
        window_length: Some(args.window),
        max_periods: 1,
        plot: false,
        plot_width: 0,
        plot_height: 0,
        export_csv: None,
        export_periods: None,
    }
}

fn env_path(var: &str) -> Option<std::path::PathBuf> {
    std::env::var_os(var).map(std::path::PathBuf::from)
}

/// Rewrite argv so `pluvio` defaults to `pluvio analyze`.
///
/// Rules:
/// - `pluvio`                      -> `pluvio analyze`
/// - `pluvio -f data.csv ...`      -> `pluvio analyze -f data.csv ...`
/// - `pluvio --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "analyze" | "scan" | "plot" | "demo" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "analyze flags".
    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
