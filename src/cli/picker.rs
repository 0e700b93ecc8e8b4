//! Interactive parameter prompting.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `pluvio` and answer two questions" UX
//!
//! Every prompt accepts `q` to cancel; EOF on a required prompt is an error
//! rather than a hang.

use std::io::{self, Write};

use crate::domain::StationDirectory;
use crate::error::AppError;

/// Prompt the user to select a station from the directory.
///
/// Behavior:
/// - list available stations (id + name)
/// - accept either a number (from the list) or a raw station id
/// - `q` cancels
pub fn prompt_for_station(stations: &StationDirectory) -> Result<String, AppError> {
    if stations.is_empty() {
        return Err(AppError::no_data("No stations available in the dataset."));
    }

    println!("Available stations:");
    for (idx, station) in stations.stations().iter().enumerate() {
        println!("{:>4}) {}", idx + 1, station.display_label());
    }

    loop {
        let input = read_prompt(&format!(
            "Select a station by number (1-{}) or id (q to quit): ",
            stations.len()
        ))?;

        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::invalid_argument("Canceled."));
        }

        match resolve_station_choice(&input, stations) {
            Some(id) => return Ok(id),
            None => println!("Unknown station '{input}'. Enter a listed number or id."),
        }
    }
}

/// Prompt for a positive window length in days.
pub fn prompt_for_window_length() -> Result<usize, AppError> {
    loop {
        let input = read_prompt("Window length in days (q to quit): ")?;

        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::invalid_argument("Canceled."));
        }

        match input.parse::<usize>() {
            Ok(days) if days > 0 => return Ok(days),
            _ => println!("The window length must be a positive number of days."),
        }
    }
}

/// Yes/no question; EOF counts as "no".
pub fn prompt_yes_no(question: &str) -> Result<bool, AppError> {
    print!("{question} (y/n): ");
    io::stdout()
        .flush()
        .map_err(|e| AppError::invalid_argument(format!("Failed to write prompt: {e}")))?;

    let mut input = String::new();
    let bytes = io::stdin()
        .read_line(&mut input)
        .map_err(|e| AppError::invalid_argument(format!("Failed to read input: {e}")))?;

    Ok(bytes > 0 && input.trim().to_ascii_lowercase().starts_with('y'))
}

/// Resolve a station answer: a 1-based list index or a raw id.
fn resolve_station_choice(input: &str, stations: &StationDirectory) -> Option<String> {
    if let Ok(choice) = input.parse::<usize>() {
        if (1..=stations.len()).contains(&choice) {
            return Some(stations.stations()[choice - 1].id.clone());
        }
    }
    stations.find(input).map(|s| s.id.clone())
}

fn read_prompt(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|e| AppError::invalid_argument(format!("Failed to write prompt: {e}")))?;

    let mut input = String::new();
    let bytes = io::stdin()
        .read_line(&mut input)
        .map_err(|e| AppError::invalid_argument(format!("Failed to read input: {e}")))?;

    if bytes == 0 {
        return Err(AppError::invalid_argument(
            "No input received. Pass -s/--station and -w/--window instead.",
        ));
    }

    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Station;

    fn directory() -> StationDirectory {
        let mut dir = StationDirectory::default();
        dir.upsert(Station {
            name: Some("ARBENT".to_string()),
            ..Station::with_id("01014002")
        });
        dir.upsert(Station::with_id("01089001"));
        dir
    }

    #[test]
    fn choice_by_list_number() {
        let dir = directory();
        assert_eq!(
            resolve_station_choice("2", &dir).as_deref(),
            Some("01089001")
        );
    }

    #[test]
    fn choice_by_raw_id() {
        let dir = directory();
        assert_eq!(
            resolve_station_choice("01014002", &dir).as_deref(),
            Some("01014002")
        );
    }

    #[test]
    fn out_of_range_number_falls_back_to_id_lookup() {
        let dir = directory();
        assert_eq!(resolve_station_choice("7", &dir), None);
    }

    #[test]
    fn unknown_id_is_rejected() {
        let dir = directory();
        assert_eq!(resolve_station_choice("nope", &dir), None);
    }
}
